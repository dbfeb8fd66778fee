//! Settle-up computation.
//!
//! Variable costs are redistributed proportionally to each user's share of
//! the total attributed distance, so the nets close to zero across the
//! group. The wear reserve is deliberately different: each user owes wear
//! for their own km and pays into the reserve independently, so wear nets
//! have no closure property.

use serde::Serialize;

use crate::{State, User, distance::attribute_distance};

/// One user's line in the settle-up overview.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserSummary {
    pub user_id: String,
    pub name: String,
    /// Attributed distance across all rides.
    pub km: f64,
    /// Variable costs this user actually paid.
    pub variable_paid: f64,
    /// This user's proportional slice of all variable costs.
    pub fair_share: f64,
    /// Positive: others owe this user. Negative: this user owes others.
    pub variable_net: f64,
    pub wear_owed: f64,
    pub wear_paid: f64,
    /// Positive: prepaid/ahead. Negative: still owes into the reserve.
    pub wear_net: f64,
}

/// Computes one summary per known user, in roster order.
///
/// Pure computation over the snapshot; callers are expected to validate the
/// configured wear rate (a negative or non-finite rate yields unspecified
/// output).
pub fn compute_settlement(state: &State, users: &[User]) -> Vec<UserSummary> {
    let roster_ids: Vec<String> = users.iter().map(|user| user.id.clone()).collect();
    let km_by_user = attribute_distance(&state.rides, &roster_ids);
    let total_km_overall: f64 = km_by_user.values().sum();
    let total_variable_costs: f64 = state.costs.iter().map(|cost| cost.amount).sum();

    users
        .iter()
        .map(|user| {
            let km = km_by_user.get(&user.id).copied().unwrap_or(0.0);

            let variable_paid: f64 = state
                .costs
                .iter()
                .filter(|cost| cost.user_id == user.id)
                .map(|cost| cost.amount)
                .sum();

            let fair_share = if total_km_overall > 0.0 {
                total_variable_costs * km / total_km_overall
            } else {
                0.0
            };

            let wear_owed = km * state.config.wear_rate_per_km;

            let wear_paid: f64 = state
                .wear_payments
                .iter()
                .filter(|payment| payment.user_id == user.id)
                .map(|payment| payment.amount)
                .sum();

            UserSummary {
                user_id: user.id.clone(),
                name: user.name.clone(),
                km,
                variable_paid,
                fair_share,
                variable_net: variable_paid - fair_share,
                wear_owed,
                wear_paid,
                wear_net: wear_paid - wear_owed,
            }
        })
        .collect()
}
