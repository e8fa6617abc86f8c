use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Recognition service responded with status {code}")]
    Remote { code: u16, body: Value },
    #[error("Timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Method task aborted: {0}")]
    Aborted(String),
}

/// A service error reduced to what is reported to the caller: a status code
/// and a JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceFailure {
    pub code: u16,
    pub body: Value,
}

impl ServiceError {
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Remote { code, .. } => *code,
            ServiceError::Timeout(_) => 504,
            ServiceError::Http(e) => e.status().map(|s| s.as_u16()).unwrap_or(500),
            _ => 500,
        }
    }

    pub fn into_failure(self) -> ServiceFailure {
        let code = self.code();
        let body = match self {
            ServiceError::Remote { body, .. } => body,
            other => json!({ "error": other.to_string(), "code": code }),
        };
        ServiceFailure { code, body }
    }
}
