//! Unified error types for the Paseo booking API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic errors, one variant per error kind
//! - `ValidationErrors`: Aggregated rule failures from the validation pipeline
//! - `AppError`: Application layer errors (wraps domain errors for HTTP responses)

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every rule failure collected for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, violation: FieldViolation) {
        self.0.push(violation);
    }

    /// Whether any violation was reported against `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", joined.join("; "))
    }
}

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),

    #[error("Slot conflict: {0}")]
    SlotConflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too early: {0}")]
    TooEarly(String),

    #[error("Duplicate rating: {0}")]
    DuplicateRating(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Stable, machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::NotFound(_) => "entity_not_found",
            DomainError::InvalidTransition(_) => "invalid_transition",
            DomainError::InvalidState(_) => "invalid_state",
            DomainError::InvalidRange(_) => "invalid_range",
            DomainError::SlotUnavailable(_) => "slot_unavailable",
            DomainError::SlotConflict(_) => "slot_conflict",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::TooEarly(_) => "too_early",
            DomainError::DuplicateRating(_) => "duplicate_rating",
            DomainError::Timeout(_) => "timeout",
            DomainError::Database(_) | DomainError::Internal(_) => "internal_error",
        }
    }

    /// Only a deadline miss is safe to retry; every other failure is a business outcome
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Timeout(_))
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors)
    }
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<ValidationErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, kind, details, violations) = match &self {
            AppError::Domain(DomainError::Validation(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error",
                "validation_error",
                Some(errors.to_string()),
                Some(errors.clone()),
            ),
            AppError::Domain(DomainError::NotFound(msg)) => (
                StatusCode::NOT_FOUND,
                "Not found",
                "entity_not_found",
                Some(msg.clone()),
                None,
            ),
            AppError::Domain(DomainError::InvalidRange(msg)) => (
                StatusCode::BAD_REQUEST,
                "Invalid range",
                "invalid_range",
                Some(msg.clone()),
                None,
            ),
            AppError::Domain(DomainError::Forbidden(msg)) => (
                StatusCode::FORBIDDEN,
                "Forbidden",
                "forbidden",
                Some(msg.clone()),
                None,
            ),
            AppError::Domain(
                e @ (DomainError::InvalidTransition(msg)
                | DomainError::InvalidState(msg)
                | DomainError::SlotUnavailable(msg)
                | DomainError::SlotConflict(msg)
                | DomainError::TooEarly(msg)
                | DomainError::DuplicateRating(msg)),
            ) => (
                StatusCode::CONFLICT,
                "Conflict",
                e.kind(),
                Some(msg.clone()),
                None,
            ),
            AppError::Domain(DomainError::Timeout(msg)) => {
                tracing::warn!("Timeout: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Timed out, please retry",
                    "timeout",
                    None,
                    None,
                )
            }
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "internal_error",
                    None,
                    None,
                )
            }
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "internal_error",
                    None,
                    None,
                )
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "Bad request",
                "bad_request",
                Some(msg.clone()),
                None,
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "unauthorized",
                None,
                None,
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "Not found",
                "entity_not_found",
                Some(msg.clone()),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            kind,
            details,
            violations,
        });

        (status, body).into_response()
    }
}
