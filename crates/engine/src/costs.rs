//! Variable cost events.
//!
//! A `CostEvent` records money a user actually spent on the car (fuel,
//! insurance, anything else). Events are immutable once created; the
//! settlement redistributes them by distance share.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CostKind {
    Fuel,
    Insurance,
    Other,
}

impl CostKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fuel => "FUEL",
            Self::Insurance => "INSURANCE",
            Self::Other => "OTHER",
        }
    }
}

impl TryFrom<&str> for CostKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "FUEL" => Ok(Self::Fuel),
            "INSURANCE" => Ok(Self::Insurance),
            "OTHER" => Ok(Self::Other),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid cost kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostEvent {
    pub id: Uuid,
    pub user_id: String,
    /// Euro amount, always positive.
    pub amount: f64,
    pub kind: CostKind,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CostEvent {
    pub fn new(
        id: Uuid,
        user_id: String,
        amount: f64,
        kind: CostKind,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id,
            user_id,
            amount,
            kind,
            description,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "costs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub kind: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CostEvent> for ActiveModel {
    fn from(cost: &CostEvent) -> Self {
        Self {
            id: ActiveValue::Set(cost.id.to_string()),
            user_id: ActiveValue::Set(cost.user_id.clone()),
            amount: ActiveValue::Set(cost.amount),
            kind: ActiveValue::Set(cost.kind.as_str().to_string()),
            description: ActiveValue::Set(cost.description.clone()),
            created_at: ActiveValue::Set(cost.created_at),
        }
    }
}

impl TryFrom<Model> for CostEvent {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("cost not exists".to_string()))?,
            user_id: model.user_id,
            amount: model.amount,
            kind: CostKind::try_from(model.kind.as_str())?,
            description: model.description,
            created_at: model.created_at,
        })
    }
}
