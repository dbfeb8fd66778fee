//! Cost API endpoints.

use axum::{Json, extract::State};

use api_types::{
    Ack,
    cost::{CostKind as ApiCostKind, CostNew},
};

use crate::{ServerError, server::ServerState};

fn map_cost_kind(kind: ApiCostKind) -> engine::CostKind {
    match kind {
        ApiCostKind::Fuel => engine::CostKind::Fuel,
        ApiCostKind::Insurance => engine::CostKind::Insurance,
        ApiCostKind::Other => engine::CostKind::Other,
    }
}

/// Handles `POST /api/costs`.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CostNew>,
) -> Result<Json<Ack>, ServerError> {
    state
        .engine
        .add_cost(
            payload.id,
            &payload.user_id,
            payload.amount,
            map_cost_kind(payload.kind),
            payload.description.as_deref(),
            payload.created_at,
        )
        .await?;
    Ok(Json(Ack { ok: true }))
}
