//! Entity to domain model mappers.

use sea_orm::ActiveValue::Set;
use user_settings_sdk::models::SettingsRecord;

use super::entity::settings;

impl From<settings::Model> for SettingsRecord {
    fn from(model: settings::Model) -> Self {
        Self {
            id: model.id,
            theme: model.theme,
            language: model.language,
            timezone: model.timezone,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Active model for inserting `record` as a new row.
#[must_use]
pub fn record_to_active_model(record: &SettingsRecord) -> settings::ActiveModel {
    settings::ActiveModel {
        id: Set(record.id),
        theme: Set(record.theme.clone()),
        language: Set(record.language.clone()),
        timezone: Set(record.timezone.clone()),
        created_at: Set(record.created_at),
        updated_at: Set(record.updated_at),
    }
}
