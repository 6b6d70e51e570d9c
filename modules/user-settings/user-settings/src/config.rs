use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::fields::FieldRules;
use crate::domain::guard::{RetryPolicy, StorageGuard};

/// Module configuration (`settings` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserSettingsConfig {
    /// Upper bound for any single storage call.
    pub storage_timeout_ms: u64,
    pub retry: RetryConfig,
    /// Accepted theme values. Empty means any bounded string.
    pub allowed_themes: Vec<String>,
    pub max_theme_length: usize,
    pub max_language_length: usize,
    pub max_timezone_length: usize,
    pub principal_source: PrincipalSource,
}

/// Who owns the `principals` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalSource {
    /// No identity store alongside: a verified caller is recorded in `principals`
    /// the first time its settings are provisioned.
    #[default]
    Standalone,
    /// An identity store writes `principals`; ids it does not know get no row.
    External,
}

impl Default for UserSettingsConfig {
    fn default() -> Self {
        Self {
            storage_timeout_ms: 2_000,
            retry: RetryConfig::default(),
            allowed_themes: vec!["light".to_owned(), "dark".to_owned(), "system".to_owned()],
            max_theme_length: 32,
            max_language_length: 35,
            max_timezone_length: 64,
            principal_source: PrincipalSource::default(),
        }
    }
}

/// Provisioning retry budget for transient storage failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_backoff_ms: 50,
            max_backoff_ms: 500,
        }
    }
}

impl UserSettingsConfig {
    #[must_use]
    pub fn field_rules(&self) -> FieldRules {
        FieldRules {
            allowed_themes: self.allowed_themes.clone(),
            max_theme_length: self.max_theme_length,
            max_language_length: self.max_language_length,
            max_timezone_length: self.max_timezone_length,
        }
    }

    #[must_use]
    pub fn storage_guard(&self) -> StorageGuard {
        StorageGuard::new(
            Duration::from_millis(self.storage_timeout_ms),
            RetryPolicy {
                max_attempts: self.retry.max_attempts.max(1),
                base_backoff: Duration::from_millis(self.retry.base_backoff_ms),
                max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
            },
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: UserSettingsConfig =
            serde_json::from_str(r#"{"storage_timeout_ms": 500, "retry": {"max_attempts": 3}}"#)
                .unwrap();
        assert_eq!(cfg.storage_timeout_ms, 500);
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry.base_backoff_ms, 50);
        assert_eq!(cfg.max_language_length, 35);
        assert_eq!(cfg.allowed_themes, vec!["light", "dark", "system"]);
        assert_eq!(cfg.principal_source, PrincipalSource::Standalone);
    }

    #[test]
    fn principal_source_is_lowercase() {
        let cfg: UserSettingsConfig =
            serde_json::from_str(r#"{"principal_source": "external"}"#).unwrap();
        assert_eq!(cfg.principal_source, PrincipalSource::External);
        assert!(
            serde_json::from_str::<UserSettingsConfig>(r#"{"principal_source": "ldap"}"#).is_err()
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<UserSettingsConfig>(r#"{"colour": "red"}"#).is_err());
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let cfg = UserSettingsConfig {
            retry: RetryConfig {
                max_attempts: 0,
                ..RetryConfig::default()
            },
            ..UserSettingsConfig::default()
        };
        assert_eq!(cfg.storage_guard().retry_policy().max_attempts, 1);
    }
}
