use axum::{Router, routing::post, middleware};
use crate::state::AppState;
use crate::handlers::sync::refresh_all;
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/sync/refresh", post(refresh_all))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
