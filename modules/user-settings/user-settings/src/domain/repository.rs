use std::sync::Arc;

use settings_auth::Principal;
use time::{Duration, OffsetDateTime};
use user_settings_sdk::models::{SettingsPatch, SettingsRecord};
use uuid::Uuid;

use super::error::DomainError;
use super::fields::FieldRules;
use super::guard::StorageGuard;
use super::store::{SettingsStore, StorageError, UpdateOutcome};

/// Upper bound on read-then-conditional-write rounds for one update.
const MAX_UPDATE_ATTEMPTS: u32 = 16;

/// Ownership-checked access to settings records.
///
/// The ownership check runs here regardless of any row policy the storage engine
/// enforces on its own.
pub struct SettingsRepository {
    store: Arc<dyn SettingsStore>,
    guard: StorageGuard,
    rules: FieldRules,
}

impl SettingsRepository {
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>, guard: StorageGuard, rules: FieldRules) -> Self {
        Self {
            store,
            guard,
            rules,
        }
    }

    /// # Errors
    /// `Forbidden` on ownership mismatch, `NotFound` when the record was never
    /// provisioned, `StorageUnavailable` on storage failure or timeout.
    pub async fn get(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<SettingsRecord, DomainError> {
        ensure_owner(principal, id)?;
        self.guard
            .call("settings.find", self.store.find_by_id(id))
            .await?
            .ok_or(DomainError::NotFound)
    }

    /// Partial update; absent fields are left unchanged.
    ///
    /// An empty patch returns the current record without touching `updated_at`.
    /// The write only lands if the row is unchanged since it was read, so
    /// `updated_at` strictly increases across concurrent writers; a lost race
    /// re-reads and tries again.
    ///
    /// # Errors
    /// `Forbidden` on ownership mismatch, `Validation` listing every invalid field,
    /// `NotFound` when the record was never provisioned, `StorageUnavailable` on
    /// storage failure, timeout, or persistent contention.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: &SettingsPatch,
    ) -> Result<SettingsRecord, DomainError> {
        ensure_owner(principal, id)?;
        self.rules
            .validate(patch)
            .map_err(DomainError::Validation)?;

        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let current = self
                .guard
                .call("settings.find", self.store.find_by_id(id))
                .await?
                .ok_or(DomainError::NotFound)?;
            if patch.is_empty() {
                return Ok(current);
            }

            let updated_at = next_updated_at(current.updated_at, super::now_utc());
            let outcome = self
                .guard
                .call(
                    "settings.update",
                    self.store
                        .update_if_unchanged(id, patch, current.updated_at, updated_at),
                )
                .await?;

            match outcome {
                UpdateOutcome::Applied => {
                    tracing::debug!(principal_id = %id, attempt, "settings updated");
                    return Ok(apply_patch(current, patch, updated_at));
                }
                UpdateOutcome::Missing => return Err(DomainError::NotFound),
                UpdateOutcome::Stale => {
                    tracing::debug!(principal_id = %id, attempt, "settings row changed, re-reading");
                }
            }
        }

        tracing::warn!(
            principal_id = %id,
            attempts = MAX_UPDATE_ATTEMPTS,
            "giving up on contended settings update"
        );
        Err(StorageError::Contention(id).into())
    }
}

fn ensure_owner(principal: &Principal, id: Uuid) -> Result<(), DomainError> {
    if principal.owns(id) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// `record` with the supplied fields and `updated_at` written over it.
pub(crate) fn apply_patch(
    mut record: SettingsRecord,
    patch: &SettingsPatch,
    updated_at: OffsetDateTime,
) -> SettingsRecord {
    if let Some(theme) = &patch.theme {
        record.theme.clone_from(theme);
    }
    if let Some(language) = &patch.language {
        record.language.clone_from(language);
    }
    if let Some(timezone) = &patch.timezone {
        record.timezone.clone_from(timezone);
    }
    record.updated_at = updated_at;
    record
}

/// `updated_at` for an update landing at `now`: never at or before the previous value.
fn next_updated_at(previous: OffsetDateTime, now: OffsetDateTime) -> OffsetDateTime {
    now.max(previous + Duration::microseconds(1))
}
