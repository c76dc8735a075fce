//! Error type definitions
//!
//! Uses `thiserror` for automatic error trait implementations and proper
//! error chaining from the SeaORM layer upward.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Input validation failures, rejected immediately and never retried
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Lookup by id, stream key or broadcast id found nothing
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Invalid lifecycle transition, e.g. starting a stream that already has
    /// a broadcast id bound
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Mutual-exclusion guard tripped, e.g. a reconciliation sweep is already
    /// running
    #[error("Operation already in progress: {operation}")]
    OperationInProgress { operation: String },

    /// Ingest-server collaborator failures (probe transport, session API)
    #[error("Ingest error: {message}")]
    Ingest { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Convenience result type using [`AppError`]
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn ingest(message: impl Into<String>) -> Self {
        Self::Ingest {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
