//! OpenAPI document for the settings routes.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::{dto, handlers};

#[derive(OpenApi)]
#[openapi(
    info(title = "User Settings API", description = "Per-principal settings"),
    paths(
        handlers::me,
        handlers::get_my_settings,
        handlers::update_my_settings,
        handlers::get_settings,
        handlers::update_settings,
        handlers::principal_created,
    ),
    components(schemas(
        dto::SettingsDto,
        dto::UpdateSettingsRequest,
        dto::MeDto,
        dto::PrincipalCreatedRequest,
        settings_errors::Problem,
        settings_errors::FieldViolation,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Users", description = "Caller identity"),
        (name = "Settings", description = "Per-principal settings"),
        (name = "Hooks", description = "Notifications from the identity store"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// The document with every path placed under `api_prefix`.
#[must_use]
pub fn openapi(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let prefix = api_prefix.trim_end_matches('/');
    if !prefix.is_empty() {
        let paths = std::mem::take(&mut doc.paths.paths);
        doc.paths.paths = paths
            .into_iter()
            .map(|(path, item)| (format!("{prefix}{path}"), item))
            .collect();
    }
    doc
}
