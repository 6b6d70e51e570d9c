#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Provisioning against a real SQLite database, with several independent pools
//! standing in for several server instances.

mod common;

use std::sync::Arc;

use futures::future::join_all;
use sea_orm::{EntityTrait, PaginatorTrait};
use settings_auth::{Principal, Role};
use time::Duration;
use user_settings::domain::store::{SettingsStore, UpdateOutcome};
use user_settings::infra::storage::SeaOrmSettingsStore;
use user_settings::infra::storage::entity::{PrincipalEntity, SettingsEntity};
use user_settings::{SettingsRecord, domain};
use user_settings::{SettingsError, SettingsPatch, UserSettingsConfig, UserSettingsModule};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_instances_create_exactly_one_row() {
    let (dir, db) = common::migrated_db().await;
    let id = common::create_principal(&db).await;

    let mut instances = Vec::new();
    for _ in 0..4 {
        let pool = common::connect(&dir.path().join("settings.db")).await;
        instances.push(UserSettingsModule::new(&pool, &UserSettingsConfig::default()).client());
    }

    let calls = instances.iter().cycle().take(16).map(|client| {
        let client = Arc::clone(client);
        tokio::spawn(async move { client.ensure_settings(id).await })
    });
    let records: Vec<_> = join_all(calls)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert!(records.iter().all(|r| r == &records[0]));
    assert_eq!(records[0].theme, "light");
    assert_eq!(SettingsEntity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn unknown_principal_gets_no_row() {
    let (_dir, db) = common::migrated_db().await;
    let client = UserSettingsModule::new(&db, &common::external_principals()).client();
    let ghost = uuid::Uuid::new_v4();

    assert_eq!(
        client.ensure_settings(ghost).await,
        Err(SettingsError::PrincipalNotFound { id: ghost })
    );
    assert_eq!(SettingsEntity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn standalone_records_the_principal_on_first_provisioning() {
    let (_dir, db) = common::migrated_db().await;
    let client = UserSettingsModule::new(&db, &UserSettingsConfig::default()).client();
    let id = uuid::Uuid::new_v4();

    let first = client.ensure_settings(id).await.unwrap();
    let again = client.ensure_settings(id).await.unwrap();

    assert_eq!(first, again);
    assert!(PrincipalEntity::find_by_id(id).one(&db).await.unwrap().is_some());
    assert_eq!(PrincipalEntity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn deleting_the_principal_removes_its_settings() {
    let (_dir, db) = common::migrated_db().await;
    let id = common::create_principal(&db).await;
    let client = UserSettingsModule::new(&db, &UserSettingsConfig::default()).client();
    client.ensure_settings(id).await.unwrap();

    common::delete_principal(&db, id).await;

    assert!(SettingsEntity::find_by_id(id).one(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn update_round_trips_through_storage() {
    let (_dir, db) = common::migrated_db().await;
    let id = common::create_principal(&db).await;
    let client = UserSettingsModule::new(&db, &UserSettingsConfig::default()).client();
    let owner = Principal::new(id, Role::User);

    let created = client.get_settings(&owner, id).await.unwrap();
    let patch = SettingsPatch {
        timezone: Some("Asia/Tokyo".to_owned()),
        ..SettingsPatch::default()
    };
    let first = client
        .update_settings(&owner, id, patch.clone())
        .await
        .unwrap();
    let second = client.update_settings(&owner, id, patch).await.unwrap();
    let read = client.get_settings(&owner, id).await.unwrap();

    assert_eq!(read, second);
    assert_eq!(read.timezone, "Asia/Tokyo");
    assert_eq!(read.theme, created.theme);
    assert_eq!(read.created_at, created.created_at);
    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn migrations_are_rerunnable() {
    let (_dir, db) = common::migrated_db().await;
    UserSettingsModule::migrate(&db).await.unwrap();
}

#[tokio::test]
async fn conditional_update_only_lands_on_the_expected_version() {
    let (_dir, db) = common::migrated_db().await;
    let id = common::create_principal(&db).await;
    let store = SeaOrmSettingsStore::new(db.clone());
    let record = SettingsRecord::with_defaults(id, domain::now_utc());
    store.insert_if_absent(&record).await.unwrap();

    let patch = SettingsPatch {
        language: Some("de".to_owned()),
        ..SettingsPatch::default()
    };
    let later = record.updated_at + Duration::seconds(1);

    let stale = store
        .update_if_unchanged(id, &patch, later, later + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(stale, UpdateOutcome::Stale);

    let applied = store
        .update_if_unchanged(id, &patch, record.updated_at, later)
        .await
        .unwrap();
    assert_eq!(applied, UpdateOutcome::Applied);

    let missing = store
        .update_if_unchanged(uuid::Uuid::new_v4(), &patch, record.updated_at, later)
        .await
        .unwrap();
    assert_eq!(missing, UpdateOutcome::Missing);

    let stored = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.language, "de");
    assert_eq!(stored.updated_at, later);
    assert_eq!(stored.created_at, record.created_at);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_keep_updated_at_increasing() {
    let (dir, db) = common::migrated_db().await;
    let id = common::create_principal(&db).await;
    let owner = Principal::new(id, Role::User);

    let mut instances = Vec::new();
    for _ in 0..4 {
        let pool = common::connect(&dir.path().join("settings.db")).await;
        instances.push(UserSettingsModule::new(&pool, &UserSettingsConfig::default()).client());
    }
    let created = instances[0].get_settings(&owner, id).await.unwrap();

    let languages = ["fr", "de", "es", "it", "pt", "nl", "sv", "pl"];
    let calls = instances
        .iter()
        .cycle()
        .zip(languages)
        .map(|(client, language)| {
            let client = Arc::clone(client);
            let owner = owner.clone();
            let patch = SettingsPatch {
                language: Some(language.to_owned()),
                ..SettingsPatch::default()
            };
            tokio::spawn(async move { client.update_settings(&owner, id, patch).await })
        });
    let results: Vec<_> = join_all(calls)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let mut stamps: Vec<_> = results.iter().map(|r| r.updated_at).collect();
    stamps.sort();
    stamps.dedup();
    assert_eq!(stamps.len(), results.len());
    assert!(stamps[0] > created.updated_at);

    let latest = results.iter().max_by_key(|r| r.updated_at).unwrap();
    let read = instances[0].get_settings(&owner, id).await.unwrap();
    assert_eq!(&read, latest);
}
