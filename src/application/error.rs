use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

use super::repos::RepoError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("resource not found")]
    NotFound,
    #[error("service is under construction; writes are disabled")]
    Maintenance,
    #[error("identifier collision; please retry")]
    IdentifierCollision,
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Maintenance => StatusCode::SERVICE_UNAVAILABLE,
            AppError::IdentifierCollision => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Infra(InfraError::Telemetry(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Infra(InfraError::Database { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Infra(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the requester.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Domain(err) => err.to_string(),
            AppError::NotFound => "Not found".to_string(),
            AppError::Maintenance => {
                "The service is under construction; writes are disabled".to_string()
            }
            AppError::IdentifierCollision => {
                "Identifier collision; please retry".to_string()
            }
            AppError::Infra(_) | AppError::Unexpected(_) => {
                "Unexpected error occurred".to_string()
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { .. } => AppError::IdentifierCollision,
            RepoError::Persistence(message) => {
                AppError::Infra(InfraError::database(message))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), self.public_message()).into_response()
    }
}
