use std::sync::{Arc, Mutex};

use migration::MigratorTrait;
use sea_orm::Database;
use uuid::Uuid;

use api_types::{cost::CostKind, ride::RideUpdate};
use client::{Client, ClientError, Store};
use engine::{Engine, State, compute_settlement, users};
use server::OcrProxy;

async fn spawn_server() -> String {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine, OcrProxy::disabled(), listener).unwrap();
    format!("http://{addr}/")
}

async fn connected_store() -> Store {
    let base_url = spawn_server().await;
    Store::new(Client::new(&base_url).unwrap())
}

#[tokio::test]
async fn snapshot_defaults_before_first_load() {
    let base_url = spawn_server().await;
    let store = Store::new(Client::new(&base_url).unwrap());

    assert!(!store.is_loaded());
    assert_eq!(store.snapshot(), State::default());
    assert_eq!(store.snapshot().config.wear_rate_per_km, 0.2);
}

#[tokio::test]
async fn refresh_loads_and_renotifies_unconditionally() {
    let store = connected_store().await;

    let seen: Arc<Mutex<Vec<State>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = store.subscribe(move |state| {
        sink.lock().unwrap().push(state.clone());
    });

    // Immediately invoked once with the current (default) snapshot.
    assert_eq!(seen.lock().unwrap().len(), 1);

    store.refresh().await.unwrap();
    store.refresh().await.unwrap();
    assert!(store.is_loaded());
    // Re-notified on every refresh, even though nothing changed.
    assert_eq!(seen.lock().unwrap().len(), 3);

    subscription.unsubscribe();
    store.refresh().await.unwrap();
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn ride_lifecycle_round_trips_through_the_server() {
    let store = connected_store().await;

    let first = store
        .submit_new_ride("jeroen", vec!["jeroen".to_string(), "stijn".to_string()], 1000.0)
        .await
        .unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.rides.len(), 1);
    assert!(snapshot.rides[0].is_open());

    // Starting the next ride implicitly closes the first at its start km.
    store
        .submit_new_ride("stijn", Vec::new(), 1050.0)
        .await
        .unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.rides.len(), 2);
    let closed = snapshot.rides.iter().find(|r| r.id == first).unwrap();
    assert_eq!(closed.end_km, Some(1050.0));
    assert_eq!(closed.tracked_distance(), Some(50.0));
}

#[tokio::test]
async fn closing_a_ride_and_backfilling_location() {
    let store = connected_store().await;

    let ride_id = store
        .submit_new_ride("silke", Vec::new(), 500.0)
        .await
        .unwrap();

    store
        .submit_ride_update(
            ride_id,
            RideUpdate {
                end_km: Some(530.5),
                ..RideUpdate::default()
            },
        )
        .await
        .unwrap();

    store
        .submit_ride_update(
            ride_id,
            RideUpdate {
                end_lat: Some(51.05),
                end_lng: Some(3.72),
                ..RideUpdate::default()
            },
        )
        .await
        .unwrap();

    let snapshot = store.snapshot();
    let ride = &snapshot.rides[0];
    assert_eq!(ride.end_km, Some(530.5));
    assert_eq!(ride.end_lat, Some(51.05));
    assert_eq!(ride.end_lng, Some(3.72));
}

#[tokio::test]
async fn settlement_is_computable_from_the_snapshot() {
    let store = connected_store().await;

    let first = store.submit_new_ride("jeroen", Vec::new(), 0.0).await.unwrap();
    store
        .submit_ride_update(
            first,
            RideUpdate {
                end_km: Some(100.0),
                ..RideUpdate::default()
            },
        )
        .await
        .unwrap();
    let second = store.submit_new_ride("stijn", Vec::new(), 100.0).await.unwrap();
    store
        .submit_ride_update(
            second,
            RideUpdate {
                end_km: Some(150.0),
                ..RideUpdate::default()
            },
        )
        .await
        .unwrap();
    store
        .submit_cost("jeroen", 60.0, CostKind::Fuel, None)
        .await
        .unwrap();

    let snapshot = store.snapshot();
    let summaries = compute_settlement(&snapshot, &users::roster());

    let jeroen = summaries.iter().find(|s| s.user_id == "jeroen").unwrap();
    let stijn = summaries.iter().find(|s| s.user_id == "stijn").unwrap();
    assert!((jeroen.variable_net - 20.0).abs() < 1e-9);
    assert!((stijn.variable_net + 20.0).abs() < 1e-9);
    assert!((jeroen.wear_owed - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn local_validation_rejects_before_any_network_call() {
    let store = connected_store().await;
    store.refresh().await.unwrap();

    let err = store
        .submit_cost("nobody", 10.0, CostKind::Fuel, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    let err = store
        .submit_cost("jeroen", -5.0, CostKind::Fuel, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    let err = store.submit_new_ride("jeroen", Vec::new(), f64::NAN).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    assert!(store.snapshot().costs.is_empty());
    assert!(store.snapshot().rides.is_empty());
}

#[tokio::test]
async fn starting_below_the_open_ride_is_rejected_locally() {
    let store = connected_store().await;

    store.submit_new_ride("jeroen", Vec::new(), 100.0).await.unwrap();
    let err = store
        .submit_new_ride("stijn", Vec::new(), 90.0)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    // The open ride is untouched.
    let snapshot = store.snapshot();
    assert_eq!(snapshot.rides.len(), 1);
    assert!(snapshot.rides[0].is_open());
}

#[tokio::test]
async fn server_rejection_leaves_the_snapshot_alone() {
    let store = connected_store().await;
    store.refresh().await.unwrap();
    let before = store.snapshot();

    let err = store
        .submit_ride_update(
            Uuid::new_v4(),
            RideUpdate {
                end_lat: Some(1.0),
                ..RideUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn dropped_subscription_stops_notifications() {
    let store = connected_store().await;

    let count = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&count);
    {
        let _subscription = store.subscribe(move |_| {
            *sink.lock().unwrap() += 1;
        });
        assert_eq!(*count.lock().unwrap(), 1);
    }

    store.refresh().await.unwrap();
    assert_eq!(*count.lock().unwrap(), 1);
}
