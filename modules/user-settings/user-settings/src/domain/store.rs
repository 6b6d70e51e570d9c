//! Storage port for settings records.

use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use user_settings_sdk::models::{SettingsPatch, SettingsRecord};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),

    #[error("storage connection failed: {0}")]
    Connection(String),

    /// The row references a principal the identity store does not have.
    #[error("principal {0} does not exist")]
    MissingPrincipal(Uuid),

    #[error("storage query failed: {0}")]
    Query(String),

    /// Conditional writes kept losing to other writers of the same row.
    #[error("row {0} kept changing under concurrent writers")]
    Contention(Uuid),
}

impl StorageError {
    /// Worth retrying: the same call may succeed a moment later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

/// Result of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Another writer got there first. Not an error.
    AlreadyExists,
}

/// Result of a conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// The row's `updated_at` no longer matches; another writer landed in between.
    Stale,
    Missing,
}

/// One row per principal, keyed by principal id.
///
/// Implementations must back `insert_if_absent` with a uniqueness constraint on
/// `id`: that constraint is the only thing serializing concurrent provisioning,
/// including across server instances.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn insert_if_absent(&self, record: &SettingsRecord)
    -> Result<InsertOutcome, StorageError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SettingsRecord>, StorageError>;

    /// Apply the supplied fields and `updated_at` in one statement, but only while
    /// the row's `updated_at` still equals `expected`.
    async fn update_if_unchanged(
        &self,
        id: Uuid,
        patch: &SettingsPatch,
        expected: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Result<UpdateOutcome, StorageError>;
}
