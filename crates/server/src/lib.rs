use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use ocr::{OcrError, OcrProxy, extract_odometer_value};
pub use server::{run, run_with_listener, spawn_with_listener};

mod costs;
mod ocr;
mod rides;
mod server;
mod snapshot;
mod wear_payments;

pub mod types {
    pub mod ride {
        pub use api_types::ride::{ParticipantIds, RideNew, RideUpdate, RideView};
    }

    pub mod cost {
        pub use api_types::cost::{CostKind, CostNew, CostView};
    }

    pub mod wear {
        pub use api_types::wear::{WearPaymentNew, WearPaymentView};
    }

    pub mod state {
        pub use api_types::state::{ConfigView, StateView};
    }

    pub mod ocr {
        pub use api_types::ocr::{OcrRequest, OcrResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Ocr(OcrError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidKm(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidRate(_)
        | EngineError::RideClosed(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn status_for_ocr_error(err: &OcrError) -> StatusCode {
    match err {
        OcrError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        OcrError::Upstream(_) | OcrError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Ocr(err) => (status_for_ocr_error(&err), err.to_string()),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<OcrError> for ServerError {
    fn from(value: OcrError) -> Self {
        Self::Ocr(value)
    }
}
