use axum::extract::{Extension, Query, State};
use axum::Json;

use super::today;
use crate::dtos::report::{selected, AnalysisQuery, AnalysisResponse};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::services::analysis::analyze;
use crate::services::reports::{period_label, ReportFilter};
use crate::state::AppState;

pub async fn get_analysis(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>, AppError> {
    if let Err(e) = state.records.refresh_orders_from_cloud().await {
        tracing::warn!("Order refresh before analysis failed: {}", e);
    }
    let users = state.records.users().await?;
    let orders = state.records.orders().await?;
    let customers = state.records.customers().await?;

    let viewer = auth.viewer();
    let period = query.period.unwrap_or_default();
    let branch = selected(query.branch);
    let label_filter = ReportFilter { branch: branch.clone(), ..ReportFilter::relative(period) };

    let analysis = analyze(&viewer, &users, orders, &customers, period, branch, today());

    Ok(Json(AnalysisResponse {
        period_label: period_label(&viewer, &label_filter),
        analysis,
    }))
}
