//! Read-time normalization from wire DTOs to domain types.
//!
//! The wire tolerates legacy shapes (participant lists as encoded strings,
//! missing fields); the rest of the crate only ever sees clean
//! `engine::State` values. This is deliberately a conversion, not a schema
//! migration.

use api_types::{
    cost::{CostKind as ApiCostKind, CostView},
    ride::RideView,
    state::StateView,
    wear::WearPaymentView,
};
use engine::{Config, CostEvent, CostKind, Ride, State, WearPayment};

fn cost_kind(kind: ApiCostKind) -> CostKind {
    match kind {
        ApiCostKind::Fuel => CostKind::Fuel,
        ApiCostKind::Insurance => CostKind::Insurance,
        ApiCostKind::Other => CostKind::Other,
    }
}

pub fn normalize_ride(view: RideView) -> Ride {
    Ride {
        id: view.id,
        user_id: view.user_id,
        participant_ids: view.participant_ids.0,
        start_km: view.start_km,
        end_km: view.end_km,
        started_at: view.started_at,
        ended_at: view.ended_at,
        end_lat: view.end_lat,
        end_lng: view.end_lng,
    }
}

fn normalize_cost(view: CostView) -> CostEvent {
    CostEvent {
        id: view.id,
        user_id: view.user_id,
        amount: view.amount,
        kind: cost_kind(view.kind),
        description: view.description,
        created_at: view.created_at,
    }
}

fn normalize_wear_payment(view: WearPaymentView) -> WearPayment {
    WearPayment {
        id: view.id,
        user_id: view.user_id,
        amount: view.amount,
        created_at: view.created_at,
    }
}

pub fn normalize_state(view: StateView) -> State {
    State {
        rides: view.rides.into_iter().map(normalize_ride).collect(),
        costs: view.costs.into_iter().map(normalize_cost).collect(),
        wear_payments: view
            .wear_payments
            .into_iter()
            .map(normalize_wear_payment)
            .collect(),
        config: Config {
            wear_rate_per_km: view.config.wear_rate_per_km,
        },
    }
}
