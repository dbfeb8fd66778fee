//! Runtime configuration stored as key/value rows.
//!
//! There is a single current wear rate; it is not versioned against
//! historical rides, so changing it retroactively changes every past ride's
//! wear-owed figure.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Key of the wear rate row in the `config` table.
pub const WEAR_RATE_KEY: &str = "wearRatePerKm";

/// Rate used when the config row is missing.
pub const DEFAULT_WEAR_RATE: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Euro per kilometre paid into the wear reserve.
    pub wear_rate_per_km: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wear_rate_per_km: DEFAULT_WEAR_RATE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Parses a stored rate value, falling back to the default for missing or
/// unusable rows.
pub fn parse_wear_rate(value: Option<&str>) -> f64 {
    value
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|rate| rate.is_finite())
        .unwrap_or(DEFAULT_WEAR_RATE)
}
