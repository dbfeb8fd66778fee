//! Snapshot API endpoint.

use axum::{Json, extract::State};

use api_types::{
    cost::{CostKind as ApiCostKind, CostView},
    ride::{ParticipantIds, RideView},
    state::{ConfigView, StateView},
    wear::WearPaymentView,
};

use crate::{ServerError, server::ServerState};

fn map_cost_kind(kind: engine::CostKind) -> ApiCostKind {
    match kind {
        engine::CostKind::Fuel => ApiCostKind::Fuel,
        engine::CostKind::Insurance => ApiCostKind::Insurance,
        engine::CostKind::Other => ApiCostKind::Other,
    }
}

fn ride_view(ride: engine::Ride) -> RideView {
    RideView {
        id: ride.id,
        user_id: ride.user_id,
        participant_ids: ParticipantIds(ride.participant_ids),
        start_km: ride.start_km,
        end_km: ride.end_km,
        started_at: ride.started_at,
        ended_at: ride.ended_at,
        end_lat: ride.end_lat,
        end_lng: ride.end_lng,
    }
}

fn cost_view(cost: engine::CostEvent) -> CostView {
    CostView {
        id: cost.id,
        user_id: cost.user_id,
        amount: cost.amount,
        kind: map_cost_kind(cost.kind),
        description: cost.description,
        created_at: cost.created_at,
    }
}

fn wear_payment_view(payment: engine::WearPayment) -> WearPaymentView {
    WearPaymentView {
        id: payment.id,
        user_id: payment.user_id,
        amount: payment.amount,
        created_at: payment.created_at,
    }
}

/// Handles `GET /api/state`: the full snapshot, rebuilt from the store on
/// every request.
pub async fn get(State(state): State<ServerState>) -> Result<Json<StateView>, ServerError> {
    let snapshot = state.engine.state().await?;

    Ok(Json(StateView {
        rides: snapshot.rides.into_iter().map(ride_view).collect(),
        costs: snapshot.costs.into_iter().map(cost_view).collect(),
        wear_payments: snapshot
            .wear_payments
            .into_iter()
            .map(wear_payment_view)
            .collect(),
        config: ConfigView {
            wear_rate_per_km: snapshot.config.wear_rate_per_km,
        },
    }))
}
