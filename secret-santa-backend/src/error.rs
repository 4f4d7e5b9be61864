use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use secret_santa_config::ConfigError;
use secret_santa_database::DatabaseError;
use secret_santa_matching::MatchingError;
use serde::Serialize;
use tracing::error;

use crate::notify::NotifyError;

/// Failures of the registration and lottery operations.
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("email already registered")]
    EmailTaken,
    #[error("email not found")]
    EmailNotFound,
    #[error("price too low, the minimum is ${min}")]
    PriceTooLow { min: f64 },
    #[error("price too high, the maximum is ${max}")]
    PriceTooHigh { max: f64 },
    #[error("at least 2 participants with a gift are required, found {found}")]
    InsufficientParticipants { found: usize },
    #[error("the lottery has already been drawn")]
    AlreadyDrawn,
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("matching error: {0}")]
    Matching(MatchingError),
    #[error("notification error: {0}")]
    Notification(String),
}

impl From<MatchingError> for ServiceError {
    fn from(value: MatchingError) -> Self {
        match value {
            MatchingError::TooFewParticipants { found } => {
                Self::InsufficientParticipants { found }
            }
            other @ MatchingError::AttemptsExhausted { .. } => Self::Matching(other),
        }
    }
}

impl ServiceError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::EmailTaken
            | Self::EmailNotFound
            | Self::PriceTooLow { .. }
            | Self::PriceTooHigh { .. }
            | Self::InsufficientParticipants { .. } => StatusCode::BAD_REQUEST,
            Self::AlreadyDrawn => StatusCode::CONFLICT,
            Self::Database(_) | Self::Matching(_) | Self::Notification(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("malformed request body: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("notification setup error: {0}")]
    Notify(#[from] NotifyError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::JsonRejection(_) => StatusCode::BAD_REQUEST,
            Self::Service(error) => error.status_code(),
            Self::File(_) | Self::Config(_) | Self::Database(_) | Self::Notify(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("{self}");
            "internal server error".to_owned()
        } else {
            self.to_string()
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
