//! Public models for the user-settings module.
//!
//! Transport-agnostic data structures shared between the module and its consumers.

use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// The one settings record a principal owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRecord {
    /// Same value as the owning principal's id.
    pub id: Uuid,
    pub theme: String,
    pub language: String,
    pub timezone: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl SettingsRecord {
    /// Record with the fixed provisioning defaults.
    #[must_use]
    pub fn with_defaults(id: Uuid, now: OffsetDateTime) -> Self {
        Self {
            id,
            theme: DEFAULT_THEME.to_owned(),
            language: DEFAULT_LANGUAGE.to_owned(),
            timezone: DEFAULT_TIMEZONE.to_owned(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` leaves the field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsPatch {
    pub theme: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
}

impl SettingsPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.language.is_none() && self.timezone.is_none()
    }
}

/// One offending field of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
