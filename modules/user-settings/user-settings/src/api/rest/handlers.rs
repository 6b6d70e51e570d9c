use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Path};
use settings_auth::Principal;
use settings_auth::axum_ext::Authz;
use settings_errors::{Problem, RequestContext};
use uuid::Uuid;

use crate::domain::error::{DomainError, domain_error_to_problem};
use crate::domain::service::Service;

use super::dto::{MeDto, PrincipalCreatedRequest, SettingsDto, UpdateSettingsRequest};

pub type ApiResult<T> = Result<T, Problem>;

type Body<T> = Result<Json<T>, JsonRejection>;

/// Identity of the caller.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Verified identity", body = MeDto),
        (status = 403, description = "Missing or invalid token", body = Problem),
    )
)]
pub async fn me(Authz(principal): Authz) -> Json<MeDto> {
    Json(MeDto::from(&principal))
}

/// Read the caller's settings, creating defaults on first access.
#[utoipa::path(
    get,
    path = "/users/me/settings",
    tag = "Settings",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Settings record", body = SettingsDto),
        (status = 403, description = "Missing or invalid token", body = Problem),
        (status = 503, description = "Storage unavailable", body = Problem),
    )
)]
pub async fn get_my_settings(
    Extension(svc): Extension<Arc<Service>>,
    Authz(principal): Authz,
    ctx: RequestContext,
) -> ApiResult<Json<SettingsDto>> {
    read(&svc, &principal, principal.id, &ctx).await
}

/// Partially update the caller's settings.
#[utoipa::path(
    method(put, patch),
    path = "/users/me/settings",
    tag = "Settings",
    security(("bearerAuth" = [])),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Updated settings record", body = SettingsDto),
        (status = 400, description = "Invalid field values", body = Problem),
        (status = 403, description = "Missing or invalid token", body = Problem),
        (status = 503, description = "Storage unavailable", body = Problem),
    )
)]
pub async fn update_my_settings(
    Extension(svc): Extension<Arc<Service>>,
    Authz(principal): Authz,
    ctx: RequestContext,
    body: Body<UpdateSettingsRequest>,
) -> ApiResult<Json<SettingsDto>> {
    write(&svc, &principal, principal.id, body, &ctx).await
}

/// Read the settings of `id`; only the owner may.
#[utoipa::path(
    get,
    path = "/users/{id}/settings",
    tag = "Settings",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Principal id")),
    responses(
        (status = 200, description = "Settings record", body = SettingsDto),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 403, description = "Not the owner, or missing token", body = Problem),
        (status = 503, description = "Storage unavailable", body = Problem),
    )
)]
pub async fn get_settings(
    Extension(svc): Extension<Arc<Service>>,
    Authz(principal): Authz,
    ctx: RequestContext,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<SettingsDto>> {
    let id = path_id(id, &ctx)?;
    read(&svc, &principal, id, &ctx).await
}

/// Partially update the settings of `id`; only the owner may.
#[utoipa::path(
    method(put, patch),
    path = "/users/{id}/settings",
    tag = "Settings",
    security(("bearerAuth" = [])),
    params(("id" = String, Path, description = "Principal id")),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Updated settings record", body = SettingsDto),
        (status = 400, description = "Malformed id or invalid field values", body = Problem),
        (status = 403, description = "Not the owner, or missing token", body = Problem),
        (status = 503, description = "Storage unavailable", body = Problem),
    )
)]
pub async fn update_settings(
    Extension(svc): Extension<Arc<Service>>,
    Authz(principal): Authz,
    ctx: RequestContext,
    id: Result<Path<Uuid>, PathRejection>,
    body: Body<UpdateSettingsRequest>,
) -> ApiResult<Json<SettingsDto>> {
    let id = path_id(id, &ctx)?;
    write(&svc, &principal, id, body, &ctx).await
}

/// Signup hook: the identity store reports a new principal.
#[utoipa::path(
    post,
    path = "/hooks/principal-created",
    tag = "Hooks",
    security(("bearerAuth" = [])),
    request_body = PrincipalCreatedRequest,
    responses(
        (status = 200, description = "Settings record for the principal", body = SettingsDto),
        (status = 400, description = "Malformed body", body = Problem),
        (status = 403, description = "Caller is not the identity store", body = Problem),
        (status = 404, description = "Principal unknown to the identity store", body = Problem),
        (status = 503, description = "Storage unavailable", body = Problem),
    )
)]
pub async fn principal_created(
    Extension(svc): Extension<Arc<Service>>,
    ctx: RequestContext,
    body: Body<PrincipalCreatedRequest>,
) -> ApiResult<Json<SettingsDto>> {
    let Json(req) = body.map_err(|e| rejection_to_problem(&e.body_text(), &ctx))?;
    let record = svc
        .on_principal_created(req.id)
        .await
        .map_err(|e| problem(&e, &ctx))?;
    Ok(Json(record.into()))
}

async fn read(
    svc: &Service,
    principal: &Principal,
    id: Uuid,
    ctx: &RequestContext,
) -> ApiResult<Json<SettingsDto>> {
    let record = svc
        .get_settings(principal, id)
        .await
        .map_err(|e| problem(&e, ctx))?;
    Ok(Json(record.into()))
}

async fn write(
    svc: &Service,
    principal: &Principal,
    id: Uuid,
    body: Body<UpdateSettingsRequest>,
    ctx: &RequestContext,
) -> ApiResult<Json<SettingsDto>> {
    // Someone else's record is 403 whatever the body looks like.
    if !principal.owns(id) {
        return Err(problem(&DomainError::Forbidden, ctx));
    }
    let Json(req) = body.map_err(|e| rejection_to_problem(&e.body_text(), ctx))?;
    let patch = req
        .into_patch()
        .map_err(|v| problem(&DomainError::Validation(v), ctx))?;

    let record = svc
        .update_settings(principal, id, &patch)
        .await
        .map_err(|e| problem(&e, ctx))?;
    Ok(Json(record.into()))
}

fn path_id(id: Result<Path<Uuid>, PathRejection>, ctx: &RequestContext) -> ApiResult<Uuid> {
    id.map(|Path(id)| id)
        .map_err(|e| rejection_to_problem(&e.body_text(), ctx))
}

fn problem(e: &DomainError, ctx: &RequestContext) -> Problem {
    domain_error_to_problem(e).in_request(ctx)
}

fn rejection_to_problem(detail: &str, ctx: &RequestContext) -> Problem {
    tracing::debug!(detail, "rejecting malformed request");
    Problem::bad_request(detail).in_request(ctx)
}
