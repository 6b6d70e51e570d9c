#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use user_settings::{PrincipalSource, UserSettingsConfig, UserSettingsModule};
use user_settings::infra::storage::entity::{PrincipalEntity, principal};
use uuid::Uuid;

/// Open a pool on the SQLite file at `path`, creating it if needed.
pub async fn connect(path: &Path) -> DatabaseConnection {
    let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
    opts.max_connections(4)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    Database::connect(opts).await.expect("connect sqlite")
}

/// Fresh migrated database in a temp dir; keep the dir alive for the test's duration.
pub async fn migrated_db() -> (tempfile::TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = connect(&dir.path().join("settings.db")).await;
    UserSettingsModule::migrate(&db).await.expect("migrate");
    (dir, db)
}

/// Module config for a deployment whose identity store owns `principals`.
pub fn external_principals() -> UserSettingsConfig {
    UserSettingsConfig {
        principal_source: PrincipalSource::External,
        ..UserSettingsConfig::default()
    }
}

/// Register a principal the way the identity store would.
pub async fn create_principal(db: &DatabaseConnection) -> Uuid {
    let id = Uuid::new_v4();
    principal::ActiveModel {
        id: Set(id),
        created_at: Set(user_settings::domain::now_utc()),
    }
    .insert(db)
    .await
    .expect("insert principal");
    id
}

pub async fn delete_principal(db: &DatabaseConnection, id: Uuid) {
    PrincipalEntity::delete_by_id(id)
        .exec(db)
        .await
        .expect("delete principal");
}
