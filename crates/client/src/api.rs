//! HTTP client for the tracker API.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use uuid::Uuid;

use api_types::{
    Ack,
    cost::CostNew,
    ocr::{OcrRequest, OcrResponse},
    ride::{RideNew, RideUpdate},
    state::StateView,
    wear::WearPaymentNew,
};

use crate::error::{ClientError, Result};

/// Timeout for the digit-recognition call; it proxies an external OCR
/// service and must not hang the caller. Ordinary mutations follow the
/// transport's own behavior.
const OCR_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ClientError::BaseUrl(err.to_string()))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::BaseUrl(err.to_string()))
    }

    pub async fn get_state(&self) -> Result<StateView> {
        let res = self
            .http
            .get(self.endpoint("api/state")?)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res.json::<StateView>().await.map_err(ClientError::Transport);
        }
        Err(error_from_response(res).await)
    }

    pub async fn create_ride(&self, ride: &RideNew) -> Result<()> {
        self.post_ack("api/rides", ride).await
    }

    pub async fn update_ride(&self, ride_id: Uuid, update: &RideUpdate) -> Result<()> {
        let endpoint = self.endpoint(&format!("api/rides/{ride_id}"))?;
        let res = self
            .http
            .put(endpoint)
            .json(update)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            res.json::<Ack>().await.map_err(ClientError::Transport)?;
            return Ok(());
        }
        Err(error_from_response(res).await)
    }

    pub async fn create_cost(&self, cost: &CostNew) -> Result<()> {
        self.post_ack("api/costs", cost).await
    }

    pub async fn create_wear_payment(&self, payment: &WearPaymentNew) -> Result<()> {
        self.post_ack("api/wear-payments", payment).await
    }

    /// Sends a base64 image to the odometer-OCR endpoint.
    ///
    /// Bounded by [`OCR_TIMEOUT`]; a timeout surfaces as a transport error,
    /// distinct from the successful-but-empty `value: null` response.
    pub async fn recognize_odometer(&self, image_data: String) -> Result<OcrResponse> {
        let res = self
            .http
            .post(self.endpoint("api/odometer-ocr")?)
            .timeout(OCR_TIMEOUT)
            .json(&OcrRequest { image_data })
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<OcrResponse>()
                .await
                .map_err(ClientError::Transport);
        }
        Err(error_from_response(res).await)
    }

    async fn post_ack<T: serde::Serialize>(&self, path: &str, payload: &T) -> Result<()> {
        let res = self
            .http
            .post(self.endpoint(path)?)
            .json(payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            res.json::<Ack>().await.map_err(ClientError::Transport)?;
            return Ok(());
        }
        Err(error_from_response(res).await)
    }
}

async fn error_from_response(res: reqwest::Response) -> ClientError {
    let status = res.status();
    let body = res
        .json::<ErrorResponse>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| "unknown error".to_string());

    match status.as_u16() {
        404 => ClientError::NotFound(body),
        400 | 422 => ClientError::Validation(body),
        _ => ClientError::Server(body),
    }
}
