use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::application::usecases::payments::PaymentError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::Unauthorized => StatusCode::UNAUTHORIZED,
            PaymentError::VerificationFailed(_) => StatusCode::FORBIDDEN,
            PaymentError::InvalidState { .. } => StatusCode::CONFLICT,
            PaymentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            PaymentError::Store(err) => {
                // Don't leak internal error detail to client
                error!(db_error = ?err, "http: request failed on the store");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<PathRejection> for PaymentError {
    fn from(rejection: PathRejection) -> Self {
        PaymentError::InvalidInput(rejection.body_text())
    }
}

impl From<JsonRejection> for PaymentError {
    fn from(rejection: JsonRejection) -> Self {
        PaymentError::InvalidInput(rejection.body_text())
    }
}
