use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorBody;

use crate::recognition::error::{ServiceError, ServiceFailure};

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("Malformed URL")]
    MalformedInput,
    #[error("Malformed image data")]
    MalformedImageData,
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Recognition service error (status {})", .0.code)]
    Service(ServiceFailure),
}

impl From<ServiceError> for ClassifyError {
    fn from(err: ServiceError) -> Self {
        ClassifyError::Service(err.into_failure())
    }
}

impl ResponseError for ClassifyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ClassifyError::MalformedInput
            | ClassifyError::MalformedImageData
            | ClassifyError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ClassifyError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ClassifyError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ClassifyError::Service(failure) => {
                StatusCode::from_u16(failure.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            ClassifyError::Service(failure) => HttpResponse::build(status).json(&failure.body),
            other => HttpResponse::build(status).json(ErrorBody {
                error: other.to_string(),
                code: status.as_u16(),
            }),
        }
    }
}
