use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router, middleware};
use settings_auth::Role;
use settings_auth::axum_ext::{AuthState, require_auth};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the settings routes on `router`.
///
/// User routes accept any authenticated principal; the signup hook additionally
/// requires the service role.
pub fn register_routes(router: Router, service: Arc<Service>, auth: &AuthState) -> Router {
    let user_routes = Router::new()
        .route("/users/me", get(handlers::me))
        .route(
            "/users/me/settings",
            get(handlers::get_my_settings)
                .put(handlers::update_my_settings)
                .patch(handlers::update_my_settings),
        )
        .route(
            "/users/{id}/settings",
            get(handlers::get_settings)
                .put(handlers::update_settings)
                .patch(handlers::update_settings),
        )
        .route_layer(middleware::from_fn_with_state(auth.clone(), require_auth));

    let hook_routes = Router::new()
        .route("/hooks/principal-created", post(handlers::principal_created))
        .route_layer(middleware::from_fn_with_state(
            auth.requiring(Role::Service),
            require_auth,
        ));

    router
        .merge(user_routes)
        .merge(hook_routes)
        .layer(Extension(service))
}
