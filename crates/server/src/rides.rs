//! Ride API endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use api_types::{
    Ack,
    ride::{RideNew, RideUpdate},
};
use engine::{NewRide, RidePatch};

use crate::{ServerError, server::ServerState};

/// Handles `POST /api/rides` (opens a ride; implicitly closes an open one).
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RideNew>,
) -> Result<Json<Ack>, ServerError> {
    let new = NewRide {
        id: payload.id,
        user_id: payload.user_id,
        participant_ids: payload.participant_ids.0,
        start_km: payload.start_km,
        started_at: payload.started_at,
    };
    state.engine.start_ride(new).await?;
    Ok(Json(Ack { ok: true }))
}

/// Handles `PUT /api/rides/{id}` (close and/or backfill end location).
///
/// Lifecycle fields in the body (initiator, participants, start time) are
/// fixed at creation; old clients re-send them and they are ignored here.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RideUpdate>,
) -> Result<Json<Ack>, ServerError> {
    let patch = RidePatch {
        start_km: payload.start_km,
        end_km: payload.end_km,
        ended_at: payload.ended_at,
        end_lat: payload.end_lat,
        end_lng: payload.end_lng,
    };
    state.engine.update_ride(id, patch).await?;
    Ok(Json(Ack { ok: true }))
}
