use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "tandem_admin")]
#[command(about = "Admin utilities for Tandem (wear rate, settle-up, roster)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./tandem.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the static user roster.
    Users,
    /// Show or change the wear rate (euro per km).
    WearRate(WearRate),
    /// Print the settle-up overview.
    Settle,
}

#[derive(Args, Debug)]
struct WearRate {
    #[command(subcommand)]
    command: WearRateCommand,
}

#[derive(Subcommand, Debug)]
enum WearRateCommand {
    Show,
    Set(WearRateSetArgs),
}

#[derive(Args, Debug)]
struct WearRateSetArgs {
    #[arg(long)]
    rate: f64,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Users => {
            for user in engine::users::roster() {
                println!("{}\t{}", user.id, user.name);
            }
        }
        Command::WearRate(WearRate {
            command: WearRateCommand::Show,
        }) => {
            println!("{} €/km", engine.wear_rate().await?);
        }
        Command::WearRate(WearRate {
            command: WearRateCommand::Set(args),
        }) => {
            if !args.rate.is_finite() || args.rate < 0.0 {
                eprintln!("rate must be a non-negative number");
                std::process::exit(2);
            }
            engine.set_wear_rate(args.rate).await?;
            println!("wear rate set to {} €/km", args.rate);
        }
        Command::Settle => {
            let summaries = engine.settlement().await?;
            println!(
                "{:<8} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
                "user", "km", "paid", "share", "net", "wear owed", "wear paid", "wear net"
            );
            for s in summaries {
                println!(
                    "{:<8} {:>9.1} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
                    s.user_id,
                    s.km,
                    s.variable_paid,
                    s.fair_share,
                    s.variable_net,
                    s.wear_owed,
                    s.wear_paid,
                    s.wear_net
                );
            }
        }
    }

    Ok(())
}
