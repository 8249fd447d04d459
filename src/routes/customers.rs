use axum::{Router, routing::get, middleware};
use crate::state::AppState;
use crate::handlers::customer::{list_customers, create_customer, get_customer, update_customer, check_eligibility};
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/{id}", get(get_customer).put(update_customer))
        .route("/customers/{id}/eligibility", get(check_eligibility))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
