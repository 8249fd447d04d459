pub mod users;
pub mod customers;
pub mod orders;
pub mod reports;
pub mod sync;

use axum::Router;
use crate::state::AppState;

pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(users::routes(state))
        .merge(customers::routes(state))
        .merge(orders::routes(state))
        .merge(reports::routes(state))
        .merge(sync::routes(state))
}
