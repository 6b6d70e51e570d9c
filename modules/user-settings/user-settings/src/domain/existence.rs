use async_trait::async_trait;
use uuid::Uuid;

use super::store::StorageError;

/// Confirms that the identity store knows a principal before a settings row is
/// created for it.
#[async_trait]
pub trait ExistenceChecker: Send + Sync {
    async fn principal_exists(&self, id: Uuid) -> Result<bool, StorageError>;
}
