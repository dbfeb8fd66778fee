//! The aggregate snapshot.
//!
//! Every derived view (distance totals, settlement) is recomputed from a
//! `State` on demand; nothing derived is ever persisted. Consumers always
//! work on an owned copy, never a live reference into the store.

use serde::{Deserialize, Serialize};

use crate::{Config, CostEvent, Ride, WearPayment};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub rides: Vec<Ride>,
    pub costs: Vec<CostEvent>,
    pub wear_payments: Vec<WearPayment>,
    pub config: Config,
}
