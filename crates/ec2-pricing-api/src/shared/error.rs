use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ec2_pricing_core::ErrorResponse;
use thiserror::Error;

/// Pricing API specific errors
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Catalog source not found: {0}")]
    SourceNotFound(String),
    #[error("Catalog source read failed: {0}")]
    SourceRead(String),
    #[error("Missing table: {0}")]
    MissingTable(String),
    #[error("Instance not found: {0}")]
    InstanceNotFound(String),
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PricingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PricingError::InstanceNotFound(_) | PricingError::EndpointNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            PricingError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            PricingError::SourceNotFound(_)
            | PricingError::SourceRead(_)
            | PricingError::MissingTable(_)
            | PricingError::Config(_)
            | PricingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to clients. Internal details stay in the server log.
    pub fn public_message(&self) -> &'static str {
        match self {
            PricingError::InstanceNotFound(_) => "Instance not found",
            PricingError::EndpointNotFound(_) => "Endpoint not found",
            PricingError::MethodNotAllowed(_) => "Method not allowed",
            _ => "Internal server error",
        }
    }
}

impl From<PricingError> for ErrorResponse {
    fn from(err: PricingError) -> Self {
        ErrorResponse::new(err.public_message())
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

pub type PricingResult<T> = std::result::Result<T, PricingError>;
