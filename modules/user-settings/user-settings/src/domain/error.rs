use settings_errors::Problem;
use user_settings_sdk::errors::SettingsError;
use user_settings_sdk::models::FieldViolation;
use uuid::Uuid;

use super::store::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Settings not found")]
    NotFound,

    #[error("Principal {id} not found")]
    PrincipalNotFound { id: Uuid },

    #[error("Validation failed: {}", describe(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] StorageError),
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<StorageError> for DomainError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::MissingPrincipal(id) => Self::PrincipalNotFound { id },
            other => Self::StorageUnavailable(other),
        }
    }
}

impl From<DomainError> for SettingsError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Forbidden => Self::Forbidden,
            DomainError::NotFound => Self::NotFound,
            DomainError::PrincipalNotFound { id } => Self::PrincipalNotFound { id },
            DomainError::Validation(violations) => Self::validation(violations),
            DomainError::StorageUnavailable(_) => Self::StorageUnavailable,
        }
    }
}

/// Map a domain error to an RFC 9457 problem.
///
/// Validation failures are expected client input and stay at debug level.
pub fn domain_error_to_problem(e: &DomainError) -> Problem {
    match e {
        DomainError::Forbidden => {
            tracing::debug!("ownership check failed");
            Problem::forbidden()
        }
        DomainError::NotFound => Problem::not_found("Settings not found"),
        DomainError::PrincipalNotFound { .. } => Problem::not_found("Principal not found"),
        DomainError::Validation(violations) => {
            tracing::debug!(error = %e, "rejecting settings update");
            Problem::validation(
                violations
                    .iter()
                    .map(|v| settings_errors::FieldViolation::new(&v.field, &v.reason))
                    .collect(),
            )
        }
        DomainError::StorageUnavailable(source) => {
            tracing::error!(error = %source, "settings storage unavailable");
            Problem::service_unavailable("Settings storage is temporarily unavailable")
        }
    }
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e)
    }
}
