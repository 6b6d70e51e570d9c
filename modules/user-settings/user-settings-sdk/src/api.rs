//! `UserSettingsClientV1` trait definition.

use async_trait::async_trait;
use settings_auth::Principal;
use uuid::Uuid;

use crate::errors::SettingsError;
use crate::models::{SettingsPatch, SettingsRecord};

/// In-process API of the user-settings module.
///
/// Read and update take the calling principal and the target record id; the two
/// must match. `ensure_settings` is the provisioning entry point used by the
/// signup notification and carries no caller.
#[async_trait]
pub trait UserSettingsClientV1: Send + Sync {
    /// Read settings, provisioning them transparently on first access.
    async fn get_settings(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<SettingsRecord, SettingsError>;

    /// Partial update. Absent fields are left unchanged.
    async fn update_settings(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: SettingsPatch,
    ) -> Result<SettingsRecord, SettingsError>;

    /// Idempotently make sure the settings record for `id` exists.
    async fn ensure_settings(&self, id: Uuid) -> Result<SettingsRecord, SettingsError>;
}
