use std::sync::Arc;

use async_trait::async_trait;
use settings_auth::Principal;
use user_settings_sdk::{SettingsError, SettingsPatch, SettingsRecord, UserSettingsClientV1};
use uuid::Uuid;

use super::service::Service;

/// In-process adapter from the domain service to the SDK trait.
pub struct LocalClient {
    service: Arc<Service>,
}

impl LocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UserSettingsClientV1 for LocalClient {
    async fn get_settings(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<SettingsRecord, SettingsError> {
        self.service
            .get_settings(principal, id)
            .await
            .map_err(Into::into)
    }

    async fn update_settings(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: SettingsPatch,
    ) -> Result<SettingsRecord, SettingsError> {
        self.service
            .update_settings(principal, id, &patch)
            .await
            .map_err(Into::into)
    }

    async fn ensure_settings(&self, id: Uuid) -> Result<SettingsRecord, SettingsError> {
        self.service
            .on_principal_created(id)
            .await
            .map_err(Into::into)
    }
}
