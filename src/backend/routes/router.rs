/**
 * Router Configuration
 *
 * Assembles the full application router:
 *
 * 1. **API routes** behind `auth_middleware`
 * 2. **`GET /realtime`**, which authenticates itself so browsers can pass
 *    the token as a query parameter
 * 3. **Fallback** 404 for unknown paths
 *
 * The auth layer is a `route_layer`, so an unknown path answers 404
 * rather than 401. Every request is traced.
 */

use axum::{http::StatusCode, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::backend::middleware::auth_middleware;
use crate::backend::realtime::handle_realtime_subscription;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let protected = configure_api_routes(Router::new()).route_layer(
        middleware::from_fn_with_state(app_state.clone(), auth_middleware),
    );

    Router::new()
        .route("/realtime", get(handle_realtime_subscription))
        .merge(protected)
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
