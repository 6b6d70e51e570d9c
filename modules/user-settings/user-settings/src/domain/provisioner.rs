//! Idempotent "make sure the settings row exists".
//!
//! The signup hook and the lazy first-access path both land here and may race,
//! in one process or across instances. No lock is taken: the uniqueness
//! constraint on the record id decides the single winner, every loser observes
//! the conflict as "already exists" and reads the winner's row.

use std::sync::Arc;

use user_settings_sdk::models::SettingsRecord;
use uuid::Uuid;

use super::error::DomainError;
use super::existence::ExistenceChecker;
use super::guard::StorageGuard;
use super::store::{InsertOutcome, SettingsStore, StorageError};

/// What one provisioning attempt observed.
#[derive(Debug)]
enum Provisioned {
    Existing(SettingsRecord),
    Created(SettingsRecord),
    UnknownPrincipal,
}

pub struct SettingsProvisioner {
    store: Arc<dyn SettingsStore>,
    existence: Arc<dyn ExistenceChecker>,
    guard: StorageGuard,
}

impl SettingsProvisioner {
    #[must_use]
    pub fn new(
        store: Arc<dyn SettingsStore>,
        existence: Arc<dyn ExistenceChecker>,
        guard: StorageGuard,
    ) -> Self {
        Self {
            store,
            existence,
            guard,
        }
    }

    /// Return the settings record for `principal_id`, creating it with defaults if absent.
    ///
    /// Safe to call any number of times from any number of concurrent callers; all of
    /// them get the same row.
    ///
    /// # Errors
    /// `PrincipalNotFound` when the identity store does not know the principal,
    /// `StorageUnavailable` once transient failures exhaust the retry budget.
    pub async fn ensure(&self, principal_id: Uuid) -> Result<SettingsRecord, DomainError> {
        let outcome = self
            .guard
            .retrying("settings.ensure", move || self.attempt(principal_id))
            .await?;

        match outcome {
            Provisioned::Existing(record) => Ok(record),
            Provisioned::Created(record) => {
                tracing::info!(principal_id = %principal_id, "provisioned default settings");
                Ok(record)
            }
            Provisioned::UnknownPrincipal => {
                tracing::error!(
                    principal_id = %principal_id,
                    "settings requested for a principal the identity store does not know"
                );
                Err(DomainError::PrincipalNotFound { id: principal_id })
            }
        }
    }

    async fn attempt(&self, id: Uuid) -> Result<Provisioned, StorageError> {
        if let Some(record) = self
            .guard
            .call("settings.find", self.store.find_by_id(id))
            .await?
        {
            return Ok(Provisioned::Existing(record));
        }

        if !self
            .guard
            .call("principal.exists", self.existence.principal_exists(id))
            .await?
        {
            return Ok(Provisioned::UnknownPrincipal);
        }

        let defaults = SettingsRecord::with_defaults(id, super::now_utc());
        let inserted = match self
            .guard
            .call("settings.insert", self.store.insert_if_absent(&defaults))
            .await
        {
            Ok(InsertOutcome::Inserted) => true,
            Ok(InsertOutcome::AlreadyExists) => {
                tracing::debug!(principal_id = %id, "settings created concurrently, reusing");
                false
            }
            // Principal deleted between the existence check and the insert.
            Err(StorageError::MissingPrincipal(_)) => return Ok(Provisioned::UnknownPrincipal),
            Err(e) => return Err(e),
        };

        // Re-read so every caller returns the stored row, whoever inserted it.
        let stored = self
            .guard
            .call("settings.find", self.store.find_by_id(id))
            .await?;
        Ok(match stored {
            Some(record) if inserted => Provisioned::Created(record),
            Some(record) => Provisioned::Existing(record),
            // Cascade-deleted right after the insert.
            None => Provisioned::UnknownPrincipal,
        })
    }
}
