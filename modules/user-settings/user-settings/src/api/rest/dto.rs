use serde::{Deserialize, Serialize};
use serde_json::Value;
use settings_auth::Principal;
use time::OffsetDateTime;
use user_settings_sdk::models::{FieldViolation, SettingsPatch, SettingsRecord};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::fields::SettingsFields;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingsDto {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub theme: String,
    pub language: String,
    pub timezone: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: OffsetDateTime,
}

impl From<SettingsRecord> for SettingsDto {
    fn from(record: SettingsRecord) -> Self {
        Self {
            id: record.id,
            theme: record.theme,
            language: record.language,
            timezone: record.timezone,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Partial update body for both PUT and PATCH.
///
/// Fields are taken as raw JSON so that a wrongly typed value is reported against
/// its field name instead of as an opaque body error. `null` means "leave unchanged".
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "dark")]
    pub theme: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "en")]
    pub language: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "UTC")]
    pub timezone: Option<Value>,
}

impl UpdateSettingsRequest {
    /// # Errors
    /// One violation per field whose value is not a string.
    pub fn into_patch(self) -> Result<SettingsPatch, Vec<FieldViolation>> {
        let mut violations = Vec::new();
        let patch = SettingsPatch {
            theme: string_field(SettingsFields::THEME, self.theme, &mut violations),
            language: string_field(SettingsFields::LANGUAGE, self.language, &mut violations),
            timezone: string_field(SettingsFields::TIMEZONE, self.timezone, &mut violations),
        };
        if violations.is_empty() {
            Ok(patch)
        } else {
            Err(violations)
        }
    }
}

fn string_field(
    field: &str,
    value: Option<Value>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            violations.push(FieldViolation::new(field, "must be a string"));
            None
        }
    }
}

/// The caller's identity as seen through its verified token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MeDto {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub email: Option<String>,
    pub role: String,
    #[schema(value_type = Object)]
    pub aud: Option<Value>,
    pub exp: Option<i64>,
}

impl From<&Principal> for MeDto {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id,
            email: p.claim_str("email").map(ToOwned::to_owned),
            role: p.role.to_string(),
            aud: p.claims.get("aud").cloned(),
            exp: p.claims.get("exp").and_then(Value::as_i64),
        }
    }
}

/// Body of the identity store's "principal created" notification.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PrincipalCreatedRequest {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
}
