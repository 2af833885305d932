use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let catalog_routes = Router::new()
        .route(
            "/api/catalog/operations",
            get(handlers::catalog::list_operations_handler),
        )
        .route(
            "/api/catalog/operations/available",
            post(handlers::catalog::available_operations_handler),
        )
        .route(
            "/api/catalog/screens",
            get(handlers::catalog::list_screens_handler),
        )
        .route(
            "/api/catalog/screens/{screen}/operations",
            get(handlers::catalog::screen_operations_handler),
        );

    let protected_routes = Router::new()
        .route(
            "/api/access/screens/{screen}",
            get(handlers::access::screen_access_handler),
        )
        .route(
            "/api/access/check",
            get(handlers::access::access_check_handler),
        )
        .route(
            "/api/access/users/{user_id}/invalidate",
            post(handlers::access::invalidate_cache_handler),
        )
        .route(
            "/api/users/{user_id}/overrides",
            get(handlers::overrides::list_overrides_handler)
                .post(handlers::overrides::create_override_handler),
        )
        .route(
            "/api/overrides/{override_id}",
            delete(handlers::overrides::revoke_override_handler),
        )
        .route_layer(from_fn(middleware::require_user));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(catalog_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
