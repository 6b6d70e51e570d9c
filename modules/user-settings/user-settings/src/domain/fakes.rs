//! In-memory storage doubles for domain tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use user_settings_sdk::models::{SettingsPatch, SettingsRecord};
use uuid::Uuid;

use super::existence::ExistenceChecker;
use super::repository::apply_patch;
use super::store::{InsertOutcome, SettingsStore, StorageError, UpdateOutcome};

/// Row store whose insert is atomic, like a primary key constraint.
///
/// `find_by_id` yields to the scheduler after taking its snapshot so that concurrent
/// callers all miss the row before any of them inserts it. Updates can be held
/// back with [`InMemoryStore::delay_next_updates`] to force a lost write race.
#[derive(Default)]
pub struct InMemoryStore {
    rows: Mutex<HashMap<Uuid, SettingsRecord>>,
    known_principals: Option<Mutex<HashSet<Uuid>>>,
    inserted: AtomicUsize,
    insert_calls: AtomicUsize,
    failing_inserts: AtomicU32,
    failing_finds: AtomicU32,
    update_calls: AtomicUsize,
    update_delays: Mutex<VecDeque<Duration>>,
}

impl InMemoryStore {
    /// Store that rejects rows for principals not in `known`, like a foreign key.
    pub fn with_foreign_key(known: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            known_principals: Some(Mutex::new(known.into_iter().collect())),
            ..Self::default()
        }
    }

    pub fn seed(&self, record: SettingsRecord) {
        self.rows.lock().unwrap().insert(record.id, record);
    }

    pub fn row(&self, id: Uuid) -> Option<SettingsRecord> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Number of inserts that actually created a row.
    pub fn inserted(&self) -> usize {
        self.inserted.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Make the next `n` inserts fail with a connection error.
    pub fn fail_next_inserts(&self, n: u32) {
        self.failing_inserts.store(n, Ordering::SeqCst);
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Sleep before each of the next updates, one delay per call, before the
    /// row is compared and written.
    pub fn delay_next_updates(&self, delays: impl IntoIterator<Item = Duration>) {
        self.update_delays.lock().unwrap().extend(delays);
    }

    /// Make the next `n` lookups fail with a non-transient query error.
    pub fn fail_next_finds(&self, n: u32) {
        self.failing_finds.store(n, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn insert_if_absent(
        &self,
        record: &SettingsRecord,
    ) -> Result<InsertOutcome, StorageError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.failing_inserts) {
            return Err(StorageError::Connection("connection reset".to_owned()));
        }
        if let Some(known) = &self.known_principals
            && !known.lock().unwrap().contains(&record.id)
        {
            return Err(StorageError::MissingPrincipal(record.id));
        }

        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&record.id) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        rows.insert(record.id, record.clone());
        self.inserted.fetch_add(1, Ordering::SeqCst);
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SettingsRecord>, StorageError> {
        if Self::take_failure(&self.failing_finds) {
            return Err(StorageError::Query("syntax error".to_owned()));
        }
        let snapshot = self.rows.lock().unwrap().get(&id).cloned();
        tokio::task::yield_now().await;
        Ok(snapshot)
    }

    async fn update_if_unchanged(
        &self,
        id: Uuid,
        patch: &SettingsPatch,
        expected: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Result<UpdateOutcome, StorageError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.update_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.get_mut(&id) else {
            return Ok(UpdateOutcome::Missing);
        };
        if row.updated_at != expected {
            return Ok(UpdateOutcome::Stale);
        }
        *row = apply_patch(row.clone(), patch, updated_at);
        Ok(UpdateOutcome::Applied)
    }
}

/// Identity store double.
#[derive(Default)]
pub struct KnownPrincipals {
    ids: Mutex<HashSet<Uuid>>,
}

impl KnownPrincipals {
    pub fn of(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            ids: Mutex::new(ids.into_iter().collect()),
        }
    }
}

#[async_trait]
impl ExistenceChecker for KnownPrincipals {
    async fn principal_exists(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.ids.lock().unwrap().contains(&id))
    }
}
