use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    /// The backing document exists but cannot be read or parsed. Never mapped to an empty collection.
    #[error("corrupt store {path}: {reason}")]
    CorruptStore { path: String, reason: String },
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn corrupt(path: &Path, reason: impl ToString) -> Self {
        Self::CorruptStore { path: path.display().to_string(), reason: reason.to_string() }
    }

    pub fn persistence(path: &Path, reason: impl ToString) -> Self {
        Self::Persistence(format!("{}: {}", path.display(), reason.to_string()))
    }

    /// Errors caused by the caller's input rather than by the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_) | Self::Conflict(_))
    }
}
