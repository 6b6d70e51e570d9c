#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! User settings SDK
//!
//! Public surface of the user-settings module:
//! - `UserSettingsClientV1` trait for in-process consumers
//! - Model types (`SettingsRecord`, `SettingsPatch`)
//! - Error type (`SettingsError`)

pub mod api;
pub mod errors;
pub mod models;

pub use api::UserSettingsClientV1;
pub use errors::SettingsError;
pub use models::{FieldViolation, SettingsPatch, SettingsRecord};
