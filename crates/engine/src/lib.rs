use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

pub use config::{Config, DEFAULT_WEAR_RATE, WEAR_RATE_KEY};
pub use costs::{CostEvent, CostKind};
pub use distance::attribute_distance;
pub use error::EngineError;
pub use rides::{NewRide, Ride, RidePatch, parse_participant_ids};
pub use settlement::{UserSummary, compute_settlement};
pub use state::State;
pub use users::User;
pub use wear::WearPayment;

mod config;
mod costs;
mod distance;
mod error;
mod rides;
mod settlement;
mod state;
pub mod users;
mod wear;

type ResultEngine<T> = Result<T, EngineError>;

/// The record store plus the domain rules around it.
///
/// The database is the single source of truth: every read rebuilds the full
/// snapshot from the raw event log, and every mutation is confirmed by the
/// store before anyone can observe it. All operations take `&self`.
#[derive(Clone, Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Returns the full snapshot: rides, costs, wear payments and config.
    pub async fn state(&self) -> ResultEngine<State> {
        let ride_models = rides::Entity::find()
            .order_by_asc(rides::Column::StartedAt)
            .all(&self.database)
            .await?;
        let mut all_rides = Vec::with_capacity(ride_models.len());
        for model in ride_models {
            all_rides.push(Ride::try_from(model)?);
        }

        let cost_models = costs::Entity::find()
            .order_by_asc(costs::Column::CreatedAt)
            .all(&self.database)
            .await?;
        let mut all_costs = Vec::with_capacity(cost_models.len());
        for model in cost_models {
            all_costs.push(CostEvent::try_from(model)?);
        }

        let wear_models = wear::Entity::find()
            .order_by_asc(wear::Column::CreatedAt)
            .all(&self.database)
            .await?;
        let mut all_payments = Vec::with_capacity(wear_models.len());
        for model in wear_models {
            all_payments.push(WearPayment::try_from(model)?);
        }

        Ok(State {
            rides: all_rides,
            costs: all_costs,
            wear_payments: all_payments,
            config: Config {
                wear_rate_per_km: self.wear_rate().await?,
            },
        })
    }

    /// Returns the currently open ride, if any (most recently started wins
    /// when old data left several open).
    pub async fn open_ride(&self) -> ResultEngine<Option<Ride>> {
        let model = rides::Entity::find()
            .filter(rides::Column::EndKm.is_null())
            .order_by_desc(rides::Column::StartedAt)
            .one(&self.database)
            .await?;
        model.map(Ride::try_from).transpose()
    }

    /// Opens a new ride.
    ///
    /// At most one ride is open at a time; an open ride is implicitly closed
    /// here, using the new ride's start odometer value as its end value. The
    /// new reading must therefore be strictly greater than the open ride's
    /// start reading.
    pub async fn start_ride(&self, new: NewRide) -> ResultEngine<Uuid> {
        if !users::is_known(&new.user_id) {
            return Err(EngineError::KeyNotFound(new.user_id.clone()));
        }
        for participant_id in &new.participant_ids {
            if !users::is_known(participant_id) {
                return Err(EngineError::KeyNotFound(participant_id.clone()));
            }
        }
        if !new.start_km.is_finite() || new.start_km < 0.0 {
            return Err(EngineError::InvalidKm(
                "start km must be a non-negative number".to_string(),
            ));
        }

        let txn = self.database.begin().await?;

        if rides::Entity::find_by_id(new.id.to_string())
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(EngineError::ExistingKey(new.id.to_string()));
        }

        let open_models = rides::Entity::find()
            .filter(rides::Column::EndKm.is_null())
            .order_by_desc(rides::Column::StartedAt)
            .all(&txn)
            .await?;
        for model in &open_models {
            if new.start_km <= model.start_km {
                return Err(EngineError::InvalidKm(format!(
                    "start km must be greater than the open ride's start km ({})",
                    model.start_km
                )));
            }
        }
        for model in open_models {
            let closed = rides::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                end_km: ActiveValue::Set(Some(new.start_km)),
                ended_at: ActiveValue::Set(Some(new.started_at)),
                ..Default::default()
            };
            closed.update(&txn).await?;
        }

        rides::ActiveModel::from(&new).insert(&txn).await?;
        txn.commit().await?;

        Ok(new.id)
    }

    /// Updates a ride: closes it and/or backfills the end location.
    ///
    /// While open, the start reading may still be corrected and the ride can
    /// be closed (end km strictly greater than start km). Once closed, only
    /// the end location may be filled in; odometer fields are frozen, though
    /// re-sending their current values is tolerated.
    pub async fn update_ride(&self, ride_id: Uuid, patch: RidePatch) -> ResultEngine<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let txn = self.database.begin().await?;

        let model = rides::Entity::find_by_id(ride_id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("ride not exists".to_string()))?;
        let ride = Ride::try_from(model)?;

        let mut active = rides::ActiveModel {
            id: ActiveValue::Set(ride.id.to_string()),
            ..Default::default()
        };
        let mut changed = false;

        if ride.is_open() {
            let start_km = patch.start_km.unwrap_or(ride.start_km);
            if !start_km.is_finite() || start_km < 0.0 {
                return Err(EngineError::InvalidKm(
                    "start km must be a non-negative number".to_string(),
                ));
            }
            if patch.start_km.is_some() {
                active.start_km = ActiveValue::Set(start_km);
                changed = true;
            }
            if let Some(end_km) = patch.end_km {
                if !end_km.is_finite() || end_km <= start_km {
                    return Err(EngineError::InvalidKm(format!(
                        "end km must be greater than the ride's start km ({start_km})"
                    )));
                }
                active.end_km = ActiveValue::Set(Some(end_km));
                active.ended_at =
                    ActiveValue::Set(Some(patch.ended_at.unwrap_or_else(Utc::now)));
                changed = true;
            } else if let Some(ended_at) = patch.ended_at {
                active.ended_at = ActiveValue::Set(Some(ended_at));
                changed = true;
            }
        } else {
            if let Some(start_km) = patch.start_km
                && start_km != ride.start_km
            {
                return Err(EngineError::RideClosed(
                    "start km cannot change anymore".to_string(),
                ));
            }
            if let Some(end_km) = patch.end_km
                && Some(end_km) != ride.end_km
            {
                return Err(EngineError::RideClosed(
                    "end km cannot change anymore".to_string(),
                ));
            }
            if let Some(ended_at) = patch.ended_at
                && Some(ended_at) != ride.ended_at
            {
                return Err(EngineError::RideClosed(
                    "end time cannot change anymore".to_string(),
                ));
            }
        }

        if let Some(end_lat) = patch.end_lat {
            active.end_lat = ActiveValue::Set(Some(end_lat));
            changed = true;
        }
        if let Some(end_lng) = patch.end_lng {
            active.end_lng = ActiveValue::Set(Some(end_lng));
            changed = true;
        }

        if changed {
            active.update(&txn).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    /// Records a variable cost event.
    pub async fn add_cost(
        &self,
        id: Uuid,
        user_id: &str,
        amount: f64,
        kind: CostKind,
        description: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        if !users::is_known(user_id) {
            return Err(EngineError::KeyNotFound(user_id.to_string()));
        }
        let cost = CostEvent::new(
            id,
            user_id.to_string(),
            amount,
            kind,
            description.map(|s| s.to_string()),
            created_at,
        )?;
        costs::ActiveModel::from(&cost).insert(&self.database).await?;
        Ok(cost.id)
    }

    /// Records a payment into the wear reserve.
    pub async fn add_wear_payment(
        &self,
        id: Uuid,
        user_id: &str,
        amount: f64,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        if !users::is_known(user_id) {
            return Err(EngineError::KeyNotFound(user_id.to_string()));
        }
        let payment = WearPayment::new(id, user_id.to_string(), amount, created_at)?;
        wear::ActiveModel::from(&payment)
            .insert(&self.database)
            .await?;
        Ok(payment.id)
    }

    /// Returns the current wear rate (default when the row is missing).
    pub async fn wear_rate(&self) -> ResultEngine<f64> {
        let row = config::Entity::find_by_id(WEAR_RATE_KEY.to_string())
            .one(&self.database)
            .await?;
        Ok(config::parse_wear_rate(row.as_ref().map(|r| r.value.as_str())))
    }

    /// Stores a new wear rate.
    pub async fn set_wear_rate(&self, rate: f64) -> ResultEngine<()> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(EngineError::InvalidRate(
                "rate must be a non-negative number".to_string(),
            ));
        }

        let existing = config::Entity::find_by_id(WEAR_RATE_KEY.to_string())
            .one(&self.database)
            .await?;
        let row = config::ActiveModel {
            key: ActiveValue::Set(WEAR_RATE_KEY.to_string()),
            value: ActiveValue::Set(rate.to_string()),
        };
        if existing.is_some() {
            row.update(&self.database).await?;
        } else {
            row.insert(&self.database).await?;
        }
        Ok(())
    }

    /// Computes the settle-up overview for the whole roster.
    pub async fn settlement(&self) -> ResultEngine<Vec<UserSummary>> {
        let snapshot = self.state().await?;
        Ok(compute_settlement(&snapshot, &users::roster()))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`, verifying the database is reachable.
    pub async fn build(self) -> ResultEngine<Engine> {
        self.database.ping().await?;
        Ok(Engine {
            database: self.database,
        })
    }
}
