//! Error types for the user-settings SDK.

use thiserror::Error;
use uuid::Uuid;

use crate::models::FieldViolation;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Settings not found")]
    NotFound,

    #[error("Principal {id} is not known to the identity store")]
    PrincipalNotFound { id: Uuid },

    #[error("Validation failed for {} field(s)", violations.len())]
    Validation { violations: Vec<FieldViolation> },

    #[error("Settings storage unavailable")]
    StorageUnavailable,
}

impl SettingsError {
    #[must_use]
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        Self::Validation { violations }
    }

    /// Whether a later retry of the same call could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable)
    }
}
