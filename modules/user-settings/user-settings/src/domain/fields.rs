use user_settings_sdk::models::{FieldViolation, SettingsPatch};

pub struct SettingsFields;

impl SettingsFields {
    pub const THEME: &'static str = "theme";
    pub const LANGUAGE: &'static str = "language";
    pub const TIMEZONE: &'static str = "timezone";
}

/// Domain of each updatable field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    /// Empty means any non-empty string up to `max_theme_length`.
    pub allowed_themes: Vec<String>,
    pub max_theme_length: usize,
    pub max_language_length: usize,
    pub max_timezone_length: usize,
}

impl Default for FieldRules {
    fn default() -> Self {
        crate::config::UserSettingsConfig::default().field_rules()
    }
}

impl FieldRules {
    /// Check every supplied field and report all offenders at once.
    ///
    /// # Errors
    /// The full list of violations when at least one field is invalid.
    pub fn validate(&self, patch: &SettingsPatch) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        if let Some(theme) = &patch.theme {
            if self.allowed_themes.is_empty() {
                check_text(
                    SettingsFields::THEME,
                    theme,
                    self.max_theme_length,
                    &mut violations,
                );
            } else if !self.allowed_themes.iter().any(|t| t == theme) {
                violations.push(FieldViolation::new(
                    SettingsFields::THEME,
                    format!("must be one of: {}", self.allowed_themes.join(", ")),
                ));
            }
        }
        if let Some(language) = &patch.language {
            check_text(
                SettingsFields::LANGUAGE,
                language,
                self.max_language_length,
                &mut violations,
            );
        }
        if let Some(timezone) = &patch.timezone {
            check_text(
                SettingsFields::TIMEZONE,
                timezone,
                self.max_timezone_length,
                &mut violations,
            );
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn check_text(field: &str, value: &str, max_len: usize, out: &mut Vec<FieldViolation>) {
    if value.trim().is_empty() {
        out.push(FieldViolation::new(field, "must not be empty"));
    } else if value.chars().count() > max_len {
        out.push(FieldViolation::new(
            field,
            format!("exceeds maximum length of {max_len}"),
        ));
    } else if value.chars().any(char::is_control) {
        out.push(FieldViolation::new(field, "must not contain control characters"));
    }
}
