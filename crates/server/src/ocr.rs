//! Odometer OCR proxy.
//!
//! The image never gets interpreted here: recognition is delegated to the
//! external OCR.Space service, and this module only reduces its raw text to
//! an odometer reading. A missing API key and an upstream failure/timeout
//! are hard errors; "no digits in the picture" is a successful empty result.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::Deserialize;
use thiserror::Error;

use api_types::ocr::{OcrRequest, OcrResponse};

use crate::{ServerError, server::ServerState};

const OCR_SPACE_ENDPOINT: &str = "https://api.ocr.space/parse/image";

pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR API key not configured on server")]
    NotConfigured,
    #[error("OCR API call failed (status {0})")]
    Upstream(u16),
    #[error("OCR request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Client for the external digit-recognition service.
#[derive(Debug)]
pub struct OcrProxy {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl OcrProxy {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: OCR_SPACE_ENDPOINT.to_string(),
            api_key,
            timeout,
        }
    }

    /// A proxy with no API key: requests fail with [`OcrError::NotConfigured`].
    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_OCR_TIMEOUT)
    }

    /// Sends one base64 image to the service and returns its raw parsed text.
    pub async fn parse_image(&self, image_data: &str) -> Result<String, OcrError> {
        let api_key = self.api_key.as_deref().ok_or(OcrError::NotConfigured)?;

        let response = self
            .http
            .post(&self.endpoint)
            .header("apikey", api_key)
            .timeout(self.timeout)
            .form(&[
                (
                    "base64Image",
                    format!("data:image/jpeg;base64,{image_data}"),
                ),
                ("language", "eng".to_string()),
                ("isOverlayRequired", "false".to_string()),
                ("OCREngine", "2".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("OCR upstream returned {status}");
            return Err(OcrError::Upstream(status.as_u16()));
        }

        let body: ParseImageResponse = response.json().await?;
        Ok(body
            .parsed_results
            .into_iter()
            .next()
            .map(|result| result.parsed_text)
            .unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct ParseImageResponse {
    #[serde(default, rename = "ParsedResults")]
    parsed_results: Vec<ParsedResult>,
}

#[derive(Debug, Deserialize)]
struct ParsedResult {
    #[serde(default, rename = "ParsedText")]
    parsed_text: String,
}

/// Reduces raw OCR text to an odometer reading.
///
/// Odometers show 4-7 digits. Longer digit runs keep the trailing 7 (leading
/// digits tend to come from trip meters or signage in the frame); shorter
/// non-empty runs are used as-is.
pub fn extract_odometer_value(raw_text: &str) -> (String, Option<f64>) {
    let digits_only: String = raw_text.chars().filter(char::is_ascii_digit).collect();

    let candidate = if digits_only.is_empty() {
        None
    } else if digits_only.len() > 7 {
        Some(&digits_only[digits_only.len() - 7..])
    } else {
        Some(digits_only.as_str())
    };

    let value = candidate
        .and_then(|digits| digits.parse::<f64>().ok())
        .filter(|value| value.is_finite());
    (digits_only, value)
}

/// Handles `POST /api/odometer-ocr`.
pub async fn recognize(
    State(state): State<ServerState>,
    Json(payload): Json<OcrRequest>,
) -> Result<Json<OcrResponse>, ServerError> {
    if payload.image_data.is_empty() {
        return Err(ServerError::Generic("imageData missing".to_string()));
    }

    let raw_text = state.ocr.parse_image(&payload.image_data).await?;

    if raw_text.is_empty() {
        return Ok(Json(OcrResponse {
            value: None,
            raw_text: String::new(),
            digits_only: String::new(),
            message: Some("No text detected".to_string()),
        }));
    }

    let (digits_only, value) = extract_odometer_value(&raw_text);
    Ok(Json(OcrResponse {
        value,
        raw_text,
        digits_only,
        message: None,
    }))
}
