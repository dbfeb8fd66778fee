use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use engine::Engine;

use crate::{costs, ocr, rides, snapshot, wear_payments};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub ocr: Arc<ocr::OcrProxy>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/state", get(snapshot::get))
        .route("/api/rides", post(rides::create))
        .route("/api/rides/{id}", put(rides::update))
        .route("/api/costs", post(costs::create))
        .route("/api/wear-payments", post(wear_payments::create))
        .route("/api/odometer-ocr", post(ocr::recognize))
        .with_state(state)
}

pub async fn run(engine: Engine, ocr: ocr::OcrProxy) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, ocr, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    ocr: ocr::OcrProxy,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        ocr: Arc::new(ocr),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    ocr: ocr::OcrProxy,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, ocr, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    async fn test_router() -> Router {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        router(ServerState {
            engine: Arc::new(engine),
            ocr: Arc::new(ocr::OcrProxy::disabled()),
        })
    }

    async fn request(
        router: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn state_starts_empty_with_default_rate() {
        let router = test_router().await;
        let (status, body) = request(router, "GET", "/api/state", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rides"], json!([]));
        assert_eq!(body["costs"], json!([]));
        assert_eq!(body["wearPayments"], json!([]));
        assert_eq!(body["config"]["wearRatePerKm"], json!(0.2));
    }

    #[tokio::test]
    async fn ride_roundtrip_through_the_api() {
        let router = test_router().await;

        let (status, body) = request(
            router.clone(),
            "POST",
            "/api/rides",
            Some(json!({
                "id": "0b6a2c52-8d2b-4f7e-a3b4-7a1de52b7a10",
                "userId": "jeroen",
                "participantIds": ["jeroen", "stijn"],
                "startKm": 12000.0,
                "startedAt": "2026-08-07T08:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));

        let (status, _) = request(
            router.clone(),
            "PUT",
            "/api/rides/0b6a2c52-8d2b-4f7e-a3b4-7a1de52b7a10",
            Some(json!({"endKm": 12050.0, "endedAt": "2026-08-07T09:00:00Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = request(router, "GET", "/api/state", None).await;
        assert_eq!(body["rides"][0]["endKm"], json!(12050.0));
        assert_eq!(
            body["rides"][0]["participantIds"],
            json!(["jeroen", "stijn"])
        );
    }

    #[tokio::test]
    async fn starting_over_an_open_ride_closes_it() {
        let router = test_router().await;

        request(
            router.clone(),
            "POST",
            "/api/rides",
            Some(json!({
                "id": "11111111-1111-4111-8111-111111111111",
                "userId": "jeroen",
                "startKm": 100.0,
                "startedAt": "2026-08-07T08:00:00Z",
            })),
        )
        .await;
        let (status, _) = request(
            router.clone(),
            "POST",
            "/api/rides",
            Some(json!({
                "id": "22222222-2222-4222-8222-222222222222",
                "userId": "stijn",
                "startKm": 150.0,
                "startedAt": "2026-08-07T10:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = request(router, "GET", "/api/state", None).await;
        assert_eq!(body["rides"][0]["endKm"], json!(150.0));
        assert_eq!(body["rides"][1]["endKm"], Value::Null);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let router = test_router().await;
        let (status, _) = request(
            router,
            "POST",
            "/api/rides",
            Some(json!({
                "id": "33333333-3333-4333-8333-333333333333",
                "userId": "nobody",
                "startKm": 1.0,
                "startedAt": "2026-08-07T08:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_positive_cost_is_unprocessable() {
        let router = test_router().await;
        let (status, body) = request(
            router,
            "POST",
            "/api/costs",
            Some(json!({
                "id": "44444444-4444-4444-8444-444444444444",
                "userId": "jeroen",
                "amount": 0.0,
                "type": "FUEL",
                "createdAt": "2026-08-07T08:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap_or_default().contains("amount"));
    }

    #[tokio::test]
    async fn updating_a_missing_ride_is_not_found() {
        let router = test_router().await;
        let (status, _) = request(
            router,
            "PUT",
            "/api/rides/55555555-5555-4555-8555-555555555555",
            Some(json!({"endKm": 10.0})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ocr_without_api_key_is_a_server_error() {
        let router = test_router().await;
        let (status, _) = request(
            router,
            "POST",
            "/api/odometer-ocr",
            Some(json!({"imageData": "aGVsbG8="})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn ocr_with_empty_image_is_a_bad_request() {
        let router = test_router().await;
        let (status, _) = request(
            router,
            "POST",
            "/api/odometer-ocr",
            Some(json!({"imageData": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wear_payment_roundtrip_through_the_api() {
        let router = test_router().await;
        let (status, _) = request(
            router.clone(),
            "POST",
            "/api/wear-payments",
            Some(json!({
                "id": "66666666-6666-4666-8666-666666666666",
                "userId": "silke",
                "amount": 25.0,
                "createdAt": "2026-08-07T08:00:00Z",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = request(router, "GET", "/api/state", None).await;
        assert_eq!(body["wearPayments"][0]["userId"], json!("silke"));
        assert_eq!(body["wearPayments"][0]["amount"], json!(25.0));
    }
}
