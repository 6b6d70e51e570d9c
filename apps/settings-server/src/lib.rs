#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Standalone HTTP host for the user-settings module.

pub mod app;
pub mod config;
pub mod cors;
pub mod health;
pub mod logging;
pub mod shutdown;

pub use app::{build_router, connect_db, run};
pub use config::AppConfig;
