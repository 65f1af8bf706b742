use axum::http::StatusCode;
use thiserror::Error;

/// Failure taxonomy shared by both services.
///
/// Messages carried in the variants are for logs and the CLI. The HTTP layer
/// answers with fixed strings instead, so provider bodies never reach a caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required credential is missing. Raised before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request body is malformed or incomplete.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The required third-party call failed or returned a non-success status.
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CoreError::Configuration(_) | CoreError::UpstreamFetch(_) | CoreError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
