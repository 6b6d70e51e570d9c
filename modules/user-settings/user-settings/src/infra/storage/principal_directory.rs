use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use super::db_error::{is_unique_violation, map_db_err};
use super::entity::{PrincipalEntity, principal};
use crate::config::PrincipalSource;
use crate::domain::existence::ExistenceChecker;
use crate::domain::store::StorageError;

/// Existence checks against the `principals` table.
///
/// With [`PrincipalSource::External`] the table is read only. With
/// [`PrincipalSource::Standalone`] this service is the only writer: any principal
/// that reaches provisioning has a verified token or came through the signup hook,
/// so it is recorded and reported as existing.
pub struct SeaOrmPrincipalDirectory {
    db: DatabaseConnection,
    source: PrincipalSource,
}

impl SeaOrmPrincipalDirectory {
    #[must_use]
    pub fn new(db: DatabaseConnection, source: PrincipalSource) -> Self {
        Self { db, source }
    }

    async fn lookup(&self, id: Uuid) -> Result<bool, StorageError> {
        PrincipalEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map(|row| row.is_some())
            .map_err(|e| map_db_err(id, &e))
    }

    async fn register(&self, id: Uuid) -> Result<(), StorageError> {
        let row = principal::ActiveModel {
            id: ActiveValue::Set(id),
            created_at: ActiveValue::Set(crate::domain::now_utc()),
        };
        let res = PrincipalEntity::insert(row)
            .on_conflict(
                OnConflict::column(principal::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;

        match res {
            Ok(0) => Ok(()),
            Ok(_) => {
                tracing::debug!(principal_id = %id, "principal registered");
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Ok(()),
            Err(e) => Err(map_db_err(id, &e)),
        }
    }
}

#[async_trait]
impl ExistenceChecker for SeaOrmPrincipalDirectory {
    async fn principal_exists(&self, id: Uuid) -> Result<bool, StorageError> {
        match self.source {
            PrincipalSource::External => self.lookup(id).await,
            PrincipalSource::Standalone => {
                self.register(id).await?;
                Ok(true)
            }
        }
    }
}
