//! `SeaORM` implementation of `SettingsStore`.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use time::OffsetDateTime;
use user_settings_sdk::models::{SettingsPatch, SettingsRecord};
use uuid::Uuid;

use super::db_error::{is_unique_violation, map_db_err};
use super::entity::{SettingsEntity, settings};
use super::mapper::record_to_active_model;
use crate::domain::store::{InsertOutcome, SettingsStore, StorageError, UpdateOutcome};

pub struct SeaOrmSettingsStore {
    db: DatabaseConnection,
}

impl SeaOrmSettingsStore {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsStore for SeaOrmSettingsStore {
    async fn insert_if_absent(
        &self,
        record: &SettingsRecord,
    ) -> Result<InsertOutcome, StorageError> {
        let res = SettingsEntity::insert(record_to_active_model(record))
            .on_conflict(
                OnConflict::column(settings::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;

        match res {
            Ok(0) => Ok(InsertOutcome::AlreadyExists),
            Ok(_) => Ok(InsertOutcome::Inserted),
            // Some drivers still report the conflict instead of skipping the row.
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::AlreadyExists),
            Err(e) => Err(map_db_err(record.id, &e)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SettingsRecord>, StorageError> {
        SettingsEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map(|m| m.map(Into::into))
            .map_err(|e| map_db_err(id, &e))
    }

    async fn update_if_unchanged(
        &self,
        id: Uuid,
        patch: &SettingsPatch,
        expected: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Result<UpdateOutcome, StorageError> {
        let am = settings::ActiveModel {
            id: ActiveValue::NotSet,
            theme: set_if_some(patch.theme.as_ref()),
            language: set_if_some(patch.language.as_ref()),
            timezone: set_if_some(patch.timezone.as_ref()),
            created_at: ActiveValue::NotSet,
            updated_at: ActiveValue::Set(updated_at),
        };

        let res = SettingsEntity::update_many()
            .set(am)
            .filter(settings::Column::Id.eq(id))
            .filter(settings::Column::UpdatedAt.eq(expected))
            .exec(&self.db)
            .await
            .map_err(|e| map_db_err(id, &e))?;
        if res.rows_affected > 0 {
            return Ok(UpdateOutcome::Applied);
        }

        // Zero rows: either the row is gone or its `updated_at` moved on.
        Ok(match self.find_by_id(id).await? {
            Some(_) => UpdateOutcome::Stale,
            None => UpdateOutcome::Missing,
        })
    }
}

fn set_if_some(value: Option<&String>) -> ActiveValue<String> {
    value.map_or(ActiveValue::NotSet, |v| ActiveValue::Set(v.clone()))
}
