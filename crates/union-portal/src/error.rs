use crate::config::ConfigError;
use crate::response;
use crate::telemetry::TelemetryError;
use crate::workflows::ownership::OwnershipError;
use crate::workflows::parcels::MatchingError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Spreadsheet(csv::Error),
    Ownership(OwnershipError),
    Matching(MatchingError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Spreadsheet(err) => write!(f, "invalid spreadsheet: {}", err),
            AppError::Ownership(err) => write!(f, "ownership error: {}", err),
            AppError::Matching(err) => write!(f, "member matching error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Spreadsheet(err) => Some(err),
            AppError::Ownership(err) => Some(err),
            AppError::Matching(err) => Some(err),
        }
    }
}

impl AppError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Spreadsheet(_) => (StatusCode::BAD_REQUEST, "invalid_spreadsheet"),
            AppError::Ownership(OwnershipError::Store(_))
            | AppError::Matching(MatchingError::Store(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error")
            }
            AppError::Matching(MatchingError::DuplicateClaim { .. }) => {
                (StatusCode::CONFLICT, "duplicate_claim")
            }
            AppError::Ownership(_) | AppError::Matching(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error")
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        response::error(status, code, self.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Spreadsheet(value)
    }
}

impl From<OwnershipError> for AppError {
    fn from(value: OwnershipError) -> Self {
        Self::Ownership(value)
    }
}

impl From<MatchingError> for AppError {
    fn from(value: MatchingError) -> Self {
        Self::Matching(value)
    }
}
