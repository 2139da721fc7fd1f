//! Shared HTTP plumbing.

use std::time::Duration;

use fey_core::error::{FeyError, Result};

pub(crate) fn build_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| FeyError::ConfigError(format!("failed to create HTTP client: {e}")))
}

pub(crate) fn request_error(service: &str, e: reqwest::Error) -> FeyError {
    if e.is_timeout() {
        FeyError::Timeout(format!("{service}: {e}"))
    } else {
        FeyError::HttpError(format!("{service}: {e}"))
    }
}

pub(crate) fn ensure_success(service: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FeyError::HttpStatus {
            service: service.to_string(),
            status: status.as_u16(),
        })
    }
}

pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    service: &str,
    response: reqwest::Response,
) -> Result<T> {
    response.json().await.map_err(|e| {
        if e.is_timeout() {
            FeyError::Timeout(format!("{service}: {e}"))
        } else {
            FeyError::MalformedResponse(format!("{service}: {e}"))
        }
    })
}

/// Reads a JSON number that upstream may send as a string.
pub(crate) fn lenient_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a non-negative JSON integer that upstream may send as a string.
pub(crate) fn lenient_u64(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
