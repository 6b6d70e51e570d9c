use std::sync::Arc;

use settings_auth::Principal;
use user_settings_sdk::models::{SettingsPatch, SettingsRecord};
use uuid::Uuid;

use super::error::DomainError;
use super::existence::ExistenceChecker;
use super::fields::FieldRules;
use super::guard::StorageGuard;
use super::provisioner::SettingsProvisioner;
use super::repository::SettingsRepository;
use super::store::SettingsStore;

/// Entry point used by the REST handlers, the signup hook and the local client.
pub struct Service {
    repository: SettingsRepository,
    provisioner: SettingsProvisioner,
}

impl Service {
    #[must_use]
    pub fn new(
        store: Arc<dyn SettingsStore>,
        existence: Arc<dyn ExistenceChecker>,
        guard: StorageGuard,
        rules: FieldRules,
    ) -> Self {
        Self {
            repository: SettingsRepository::new(Arc::clone(&store), guard.clone(), rules),
            provisioner: SettingsProvisioner::new(store, existence, guard),
        }
    }

    /// Read settings, provisioning them on first access. Never `NotFound`.
    ///
    /// # Errors
    /// `Forbidden`, `PrincipalNotFound` or `StorageUnavailable`.
    pub async fn get_settings(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<SettingsRecord, DomainError> {
        match self.repository.get(principal, id).await {
            Err(DomainError::NotFound) => self.provisioner.ensure(id).await,
            other => other,
        }
    }

    /// Partial update, provisioning first if the record does not exist yet.
    ///
    /// # Errors
    /// `Forbidden`, `Validation`, `PrincipalNotFound` or `StorageUnavailable`.
    pub async fn update_settings(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: &SettingsPatch,
    ) -> Result<SettingsRecord, DomainError> {
        match self.repository.update(principal, id, patch).await {
            Err(DomainError::NotFound) => {
                self.provisioner.ensure(id).await?;
                self.repository.update(principal, id, patch).await
            }
            other => other,
        }
    }

    /// Signup notification from the identity store. Tolerates repeats.
    ///
    /// # Errors
    /// `PrincipalNotFound` or `StorageUnavailable`.
    pub async fn on_principal_created(&self, id: Uuid) -> Result<SettingsRecord, DomainError> {
        tracing::debug!(principal_id = %id, "principal created notification");
        self.provisioner.ensure(id).await
    }
}
