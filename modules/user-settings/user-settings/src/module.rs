use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use settings_auth::axum_ext::AuthState;
use tracing::info;
use user_settings_sdk::UserSettingsClientV1;

use crate::api::rest::routes;
use crate::config::UserSettingsConfig;
use crate::domain::existence::ExistenceChecker;
use crate::domain::local_client::LocalClient;
use crate::domain::service::Service;
use crate::domain::store::SettingsStore;
use crate::infra::storage::{SeaOrmPrincipalDirectory, SeaOrmSettingsStore, migrations};

/// Wiring for the settings module: storage, domain service, REST routes.
pub struct UserSettingsModule {
    service: Arc<Service>,
}

impl UserSettingsModule {
    /// Build on top of a `SeaORM` connection.
    #[must_use]
    pub fn new(db: &DatabaseConnection, config: &UserSettingsConfig) -> Self {
        Self::from_parts(
            Arc::new(SeaOrmSettingsStore::new(db.clone())),
            Arc::new(SeaOrmPrincipalDirectory::new(
                db.clone(),
                config.principal_source,
            )),
            config,
        )
    }

    /// Build on top of any store and identity lookup.
    #[must_use]
    pub fn from_parts(
        store: Arc<dyn SettingsStore>,
        existence: Arc<dyn ExistenceChecker>,
        config: &UserSettingsConfig,
    ) -> Self {
        let service = Service::new(
            store,
            existence,
            config.storage_guard(),
            config.field_rules(),
        );
        info!(
            storage_timeout_ms = config.storage_timeout_ms,
            retry_attempts = config.retry.max_attempts,
            principal_source = ?config.principal_source,
            "user settings module initialized"
        );
        Self {
            service: Arc::new(service),
        }
    }

    /// Apply the module's schema migrations.
    ///
    /// # Errors
    /// Any migration failure.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running user settings database migrations");
        migrations::Migrator::up(db, None).await?;
        info!("User settings database migrations completed");
        Ok(())
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    /// In-process client for other modules.
    #[must_use]
    pub fn client(&self) -> Arc<dyn UserSettingsClientV1> {
        Arc::new(LocalClient::new(self.service()))
    }

    /// REST routes, relative to the API prefix.
    #[must_use]
    pub fn router(&self, auth: &AuthState) -> Router {
        info!("Registering user settings REST routes");
        routes::register_routes(Router::new(), self.service(), auth)
    }
}
