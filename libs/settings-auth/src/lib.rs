#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Authentication and role gating for the settings service.
//!
//! Requests flow through [`TokenVerifier`] (signature and expiry, no I/O) and then
//! [`AuthorizationGate`] (role requirement). Handlers only ever see a [`Principal`].

pub mod authorizer;
pub mod claims;
pub mod config;
pub mod errors;
pub mod principal;
pub mod verifier;

#[cfg(feature = "axum-ext")]
pub mod axum_ext;

pub use authorizer::AuthorizationGate;
pub use claims::Claims;
pub use config::JwtConfig;
pub use errors::{AuthError, AuthzError, ConfigError};
pub use principal::{Principal, Role};
pub use verifier::{JwtVerifier, TokenVerifier};
