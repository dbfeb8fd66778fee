//! Wear reserve payments.
//!
//! A `WearPayment` is money a user contributed toward the notional
//! wear/depreciation reserve. Unlike variable costs, the reserve is never
//! redistributed: each user owes wear for their own km and pays
//! independently.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WearPayment {
    pub id: Uuid,
    pub user_id: String,
    /// Euro amount, always positive.
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl WearPayment {
    pub fn new(
        id: Uuid,
        user_id: String,
        amount: f64,
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
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wear_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&WearPayment> for ActiveModel {
    fn from(payment: &WearPayment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id.to_string()),
            user_id: ActiveValue::Set(payment.user_id.clone()),
            amount: ActiveValue::Set(payment.amount),
            created_at: ActiveValue::Set(payment.created_at),
        }
    }
}

impl TryFrom<Model> for WearPayment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("wear payment not exists".to_string()))?,
            user_id: model.user_id,
            amount: model.amount,
            created_at: model.created_at,
        })
    }
}
