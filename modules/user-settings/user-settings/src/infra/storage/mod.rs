//! SeaORM-backed storage for settings records.

pub mod db_error;
pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod principal_directory;
pub mod sea_orm_store;

pub use principal_directory::SeaOrmPrincipalDirectory;
pub use sea_orm_store::SeaOrmSettingsStore;
