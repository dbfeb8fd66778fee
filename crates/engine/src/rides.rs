//! Ride primitives.
//!
//! A `Ride` is a single usage interval of the car, from a start odometer
//! reading to an end odometer reading, shared by one or more participants.
//! A ride with no end reading is "open"; at most one ride is open at a time.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    /// The user who started the ride.
    pub user_id: String,
    pub participant_ids: Vec<String>,
    pub start_km: f64,
    pub end_km: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
}

impl Ride {
    pub fn is_open(&self) -> bool {
        self.end_km.is_none()
    }

    /// Participants sharing this ride's distance.
    ///
    /// Rides recorded before participant tracking existed carry an empty
    /// list; those fall back to the initiator alone. Derived totals for old
    /// data depend on this fallback staying exactly as-is.
    pub fn participants(&self) -> Vec<String> {
        if self.participant_ids.is_empty() {
            vec![self.user_id.clone()]
        } else {
            self.participant_ids.clone()
        }
    }

    /// Distance covered, if the ride is closed with a usable odometer pair.
    ///
    /// Zero or negative deltas are untracked, not an error.
    pub fn tracked_distance(&self) -> Option<f64> {
        let end_km = self.end_km?;
        let delta = end_km - self.start_km;
        (delta.is_finite() && delta > 0.0).then_some(delta)
    }
}

/// Payload for opening a ride.
#[derive(Clone, Debug)]
pub struct NewRide {
    pub id: Uuid,
    pub user_id: String,
    /// Empty means "initiator only" (stored as-is, resolved on read).
    pub participant_ids: Vec<String>,
    pub start_km: f64,
    pub started_at: DateTime<Utc>,
}

/// Partial update for a ride; `None` leaves a field unchanged.
#[derive(Clone, Debug, Default)]
pub struct RidePatch {
    pub start_km: Option<f64>,
    pub end_km: Option<f64>,
    pub ended_at: Option<DateTime<Utc>>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
}

impl RidePatch {
    pub fn is_empty(&self) -> bool {
        self.start_km.is_none()
            && self.end_km.is_none()
            && self.ended_at.is_none()
            && self.end_lat.is_none()
            && self.end_lng.is_none()
    }
}

/// Parses the stored participant list.
///
/// The column holds a JSON-encoded list, but older deployments stored the
/// list double-encoded (a JSON string that itself contains JSON). Both are
/// accepted; anything else yields an empty list.
pub fn parse_participant_ids(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(id) => Some(id),
                _ => None,
            })
            .collect(),
        Ok(serde_json::Value::String(inner)) => parse_participant_ids(Some(&inner)),
        _ => Vec::new(),
    }
}

fn encode_participant_ids(ids: &[String]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rides")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub participant_ids: Option<String>,
    pub start_km: f64,
    pub end_km: Option<f64>,
    pub started_at: DateTimeUtc,
    pub ended_at: Option<DateTimeUtc>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&NewRide> for ActiveModel {
    fn from(ride: &NewRide) -> Self {
        Self {
            id: ActiveValue::Set(ride.id.to_string()),
            user_id: ActiveValue::Set(ride.user_id.clone()),
            participant_ids: ActiveValue::Set(Some(encode_participant_ids(&ride.participant_ids))),
            start_km: ActiveValue::Set(ride.start_km),
            end_km: ActiveValue::Set(None),
            started_at: ActiveValue::Set(ride.started_at),
            ended_at: ActiveValue::Set(None),
            end_lat: ActiveValue::Set(None),
            end_lng: ActiveValue::Set(None),
        }
    }
}

impl TryFrom<Model> for Ride {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("ride not exists".to_string()))?,
            user_id: model.user_id,
            participant_ids: parse_participant_ids(model.participant_ids.as_deref()),
            start_km: model.start_km,
            end_km: model.end_km,
            started_at: model.started_at,
            ended_at: model.ended_at,
            end_lat: model.end_lat,
            end_lng: model.end_lng,
        })
    }
}
