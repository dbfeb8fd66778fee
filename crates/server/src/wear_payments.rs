//! Wear payment API endpoints.

use axum::{Json, extract::State};

use api_types::{Ack, wear::WearPaymentNew};

use crate::{ServerError, server::ServerState};

/// Handles `POST /api/wear-payments`.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<WearPaymentNew>,
) -> Result<Json<Ack>, ServerError> {
    state
        .engine
        .add_wear_payment(
            payload.id,
            &payload.user_id,
            payload.amount,
            payload.created_at,
        )
        .await?;
    Ok(Json(Ack { ok: true }))
}
