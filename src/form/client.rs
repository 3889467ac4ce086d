use log::{debug, error};
use reqwest::{header, Client, StatusCode, Url};
use thiserror::Error;

use super::{PredictionRequest, PredictionResult};

/// Shown when a failure carries no message of its own.
pub const FALLBACK_MESSAGE: &str = "Failed to get prediction";

#[derive(Debug, Error)]
pub enum PredictionError {
    /// Non-2xx answer. `message` is the server's `detail` or a generated one.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

impl PredictionError {
    /// Text for the error banner.
    pub fn user_message(&self) -> String {
        or_fallback(self.to_string())
    }
}

fn or_fallback(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}

fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|mut body| body.as_object_mut().and_then(|o| o.remove("detail")));

    match detail {
        Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail,
        Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) | None => {
            format!("HTTP error! status: {}", status.as_u16())
        }
        Some(other) => other.to_string(),
    }
}

/// Talks to the prediction service. Built without a timeout: a request runs
/// until the server answers or the connection fails.
#[derive(Clone)]
pub struct PredictionClient {
    http: Client,
    endpoint: Url,
}

impl PredictionClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
        let result = self.send(request).await;
        if let Err(e) = &result {
            error!("Error details: {:?}", e);
        }
        result
    }

    async fn send(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionError> {
        debug!("POST {} (age {})", self.endpoint, request.age);

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(PredictionError::Rejected {
                status,
                message: rejection_message(status, &body),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
