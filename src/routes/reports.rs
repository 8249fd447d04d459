use axum::{Router, routing::get, middleware};
use crate::state::AppState;
use crate::handlers::report::{get_dashboard, get_sales_log, get_summary};
use crate::handlers::analysis::get_analysis;
use crate::middleware::auth::require_auth;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/reports/dashboard", get(get_dashboard))
        .route("/reports/sales-log", get(get_sales_log))
        .route("/reports/summary", get(get_summary))
        .route("/analysis", get(get_analysis))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
