#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! User settings module
//!
//! One settings record per principal, created by whichever of the signup hook or
//! the first authenticated access gets there first. The public API is defined in
//! `user-settings-sdk` and re-exported here.

pub use user_settings_sdk::{
    FieldViolation, SettingsError, SettingsPatch, SettingsRecord, UserSettingsClientV1,
};

pub mod config;
pub mod module;

pub use config::{PrincipalSource, UserSettingsConfig};
pub use module::UserSettingsModule;

pub mod api;
pub mod domain;
pub mod infra;
