//! Error taxonomy shared by the linkage engine and the catalog service.

use sea_orm::DbErr;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or missing input, detected before any write occurs
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A referenced id does not resolve to an existing record
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness rule would be violated
    #[error("{0}")]
    Conflict(String),

    /// The entity store is unreachable or a write failed
    #[error("storage error: {0}")]
    Storage(#[from] DbErr),
}

impl CoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
