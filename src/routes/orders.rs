use axum::{Router, routing::{get, post}, middleware};
use crate::state::AppState;
use crate::handlers::order::{list_orders, create_order, preview_order, get_order, get_order_quote};
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/preview", post(preview_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/quote", get(get_order_quote))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
