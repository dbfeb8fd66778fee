//! Observable snapshot store.
//!
//! One `Store` instance per process owns the in-memory snapshot; consumers
//! get it injected rather than reaching for a global. Mutations go to the
//! server first and the snapshot is only replaced - wholesale - after the
//! server confirms, so observers always see either the pre-mutation or the
//! fully post-mutation state. No optimistic local mutation.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use uuid::Uuid;

use api_types::{
    cost::{CostKind, CostNew},
    ocr::OcrResponse,
    ride::{ParticipantIds, RideNew, RideUpdate},
    wear::WearPaymentNew,
};
use engine::{Ride, State, users};

use crate::{
    api::Client,
    error::{ClientError, Result},
    normalize::normalize_state,
};

type Observer = Arc<dyn Fn(&State) + Send + Sync>;

struct ObserverEntry {
    id: u64,
    observer: Observer,
}

pub struct Store {
    client: Client,
    snapshot: Mutex<State>,
    loaded: AtomicBool,
    observers: Arc<Mutex<Vec<ObserverEntry>>>,
    next_observer_id: AtomicU64,
}

/// Deregistration token returned by [`Store::subscribe`]; dropping it
/// removes the observer.
pub struct Subscription {
    observers: Arc<Mutex<Vec<ObserverEntry>>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        observers.retain(|entry| entry.id != self.id);
    }
}

impl Store {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            snapshot: Mutex::new(State::default()),
            loaded: AtomicBool::new(false),
            observers: Arc::new(Mutex::new(Vec::new())),
            next_observer_id: AtomicU64::new(0),
        }
    }

    /// Returns the most recently fetched snapshot (the default empty state
    /// until the first successful [`refresh`](Store::refresh)).
    pub fn snapshot(&self) -> State {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Registers an observer: invoked once immediately with the current
    /// snapshot and again after every refresh.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&State) + Send + Sync + 'static,
    {
        let observer: Observer = Arc::new(observer);
        let id = self.next_observer_id.fetch_add(1, Ordering::SeqCst);
        {
            let mut observers = self
                .observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            observers.push(ObserverEntry {
                id,
                observer: Arc::clone(&observer),
            });
        }

        let current = self.snapshot();
        observer(&current);

        Subscription {
            observers: Arc::clone(&self.observers),
            id,
        }
    }

    /// Re-fetches the snapshot and re-notifies all observers.
    ///
    /// Notification is unconditional after a successful fetch, even when the
    /// content did not change. On failure the snapshot keeps its last value
    /// and no one is notified; the next call retries.
    pub async fn refresh(&self) -> Result<()> {
        let view = match self.client.get_state().await {
            Ok(view) => view,
            Err(err) => {
                tracing::warn!("failed to load state: {err}");
                return Err(err);
            }
        };

        {
            let mut snapshot = self
                .snapshot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *snapshot = normalize_state(view);
        }
        self.loaded.store(true, Ordering::SeqCst);
        self.notify();
        Ok(())
    }

    /// Starts a ride. An open ride is implicitly closed server-side with
    /// this ride's start km.
    pub async fn submit_new_ride(
        &self,
        user_id: &str,
        participant_ids: Vec<String>,
        start_km: f64,
    ) -> Result<Uuid> {
        if !users::is_known(user_id) {
            return Err(ClientError::Validation("Select a user.".to_string()));
        }
        for participant_id in &participant_ids {
            if !users::is_known(participant_id) {
                return Err(ClientError::Validation(format!(
                    "Unknown participant: {participant_id}."
                )));
            }
        }
        if !start_km.is_finite() || start_km < 0.0 {
            return Err(ClientError::Validation(
                "Enter a valid km value.".to_string(),
            ));
        }
        if let Some(open) = self.open_ride()
            && start_km <= open.start_km
        {
            return Err(ClientError::Validation(format!(
                "Current km must be greater than the open ride's start km ({}).",
                open.start_km
            )));
        }

        let ride = RideNew {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            participant_ids: ParticipantIds(participant_ids),
            start_km,
            started_at: Utc::now(),
        };
        self.client.create_ride(&ride).await?;
        self.refresh().await?;
        Ok(ride.id)
    }

    /// Updates a ride: used both to close an open ride and to backfill the
    /// end location.
    pub async fn submit_ride_update(&self, ride_id: Uuid, update: RideUpdate) -> Result<()> {
        if let Some(end_km) = update.end_km {
            if !end_km.is_finite() {
                return Err(ClientError::Validation(
                    "Enter a valid km value.".to_string(),
                ));
            }
            let known_start = self
                .snapshot()
                .rides
                .iter()
                .find(|ride| ride.id == ride_id)
                .map(|ride| update.start_km.unwrap_or(ride.start_km));
            if let Some(start_km) = known_start
                && end_km <= start_km
            {
                return Err(ClientError::Validation(format!(
                    "End km must be greater than the ride's start km ({start_km})."
                )));
            }
        }

        self.client.update_ride(ride_id, &update).await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn submit_cost(
        &self,
        user_id: &str,
        amount: f64,
        kind: CostKind,
        description: Option<String>,
    ) -> Result<Uuid> {
        if !users::is_known(user_id) {
            return Err(ClientError::Validation("Select a user.".to_string()));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ClientError::Validation(
                "Enter a positive amount.".to_string(),
            ));
        }

        let cost = CostNew {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            amount,
            kind,
            description,
            created_at: Utc::now(),
        };
        self.client.create_cost(&cost).await?;
        self.refresh().await?;
        Ok(cost.id)
    }

    pub async fn submit_wear_payment(&self, user_id: &str, amount: f64) -> Result<Uuid> {
        if !users::is_known(user_id) {
            return Err(ClientError::Validation("Select a user.".to_string()));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ClientError::Validation(
                "Enter a positive amount.".to_string(),
            ));
        }

        let payment = WearPaymentNew {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            amount,
            created_at: Utc::now(),
        };
        self.client.create_wear_payment(&payment).await?;
        self.refresh().await?;
        Ok(payment.id)
    }

    /// Runs a camera frame through the odometer-OCR endpoint.
    pub async fn scan_odometer(&self, image: &[u8]) -> Result<OcrResponse> {
        if image.is_empty() {
            return Err(ClientError::Validation("Take a picture first.".to_string()));
        }
        self.client
            .recognize_odometer(BASE64.encode(image))
            .await
    }

    fn open_ride(&self) -> Option<Ride> {
        let snapshot = self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        snapshot
            .rides
            .iter()
            .filter(|ride| ride.is_open())
            .max_by_key(|ride| ride.started_at)
            .cloned()
    }

    fn notify(&self) {
        let current = self.snapshot();
        let observers: Vec<Observer> = {
            let observers = self
                .observers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            observers
                .iter()
                .map(|entry| Arc::clone(&entry.observer))
                .collect()
        };
        for observer in observers {
            observer(&current);
        }
    }
}
