use axum::extract::State;
use axum::Json;

use crate::dtos::report::SyncRefreshResponse;
use crate::error::AppError;
use crate::state::AppState;

// Manual pull of every collection from the sheet
pub async fn refresh_all(State(state): State<AppState>) -> Result<Json<SyncRefreshResponse>, AppError> {
    let users = state.records.refresh_users_from_cloud().await?;
    let customers = state.records.refresh_customers_from_cloud().await?;
    let orders = state.records.refresh_orders_from_cloud().await?;

    tracing::info!(users, customers, orders, "Manual sync refresh finished");
    Ok(Json(SyncRefreshResponse { users, customers, orders }))
}
