use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::Response;
use thiserror::Error;

use crate::application::repos::RepoError;
use crate::infra::error::InfraError;

/// Structured diagnostic attached to error responses.
///
/// Handlers attach a report to the response extensions so the shared
/// logging middleware can emit the full error chain without leaking it to
/// the client.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failure surface of the entity services.
///
/// The service layer is the single place where repository absence becomes
/// a reported NotFound.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }
}

/// Top-level application failure, reported by the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
