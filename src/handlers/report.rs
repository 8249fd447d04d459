use axum::extract::{Extension, Query, State};
use axum::Json;
use chrono::Datelike;

use super::customer::names_by_id;
use super::today;
use crate::dtos::order::OrderResponse;
use crate::dtos::report::{selected, DashboardResponse, ReportQuery, SalesLogResponse, SummaryQuery, SummaryResponse};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::order::Order;
use crate::models::user::User;
use crate::services::reports::{dashboard, filter_orders, period_label, summary, ReportFilter};
use crate::state::AppState;

/// Pulls the latest orders from the sheet, then filters them for the caller.
pub(crate) async fn load_report_orders(
    state: &AppState,
    auth: &AuthContext,
    filter: &ReportFilter,
) -> Result<(Vec<User>, Vec<Order>), AppError> {
    if let Err(e) = state.records.refresh_orders_from_cloud().await {
        tracing::warn!("Order refresh before report failed: {}", e);
    }
    let users = state.records.users().await?;
    let orders = filter_orders(&auth.viewer(), &users, state.records.orders().await?, filter, today());
    Ok((users, orders))
}

fn relative_filter(query: ReportQuery) -> ReportFilter {
    ReportFilter {
        branch: selected(query.branch),
        employee_id: selected(query.employee_id),
        ..ReportFilter::relative(query.period.unwrap_or_default())
    }
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let filter = relative_filter(query);
    let (_, orders) = load_report_orders(&state, &auth, &filter).await?;
    let viewer = auth.viewer();

    Ok(Json(DashboardResponse {
        period_label: period_label(&viewer, &filter),
        dashboard: dashboard(&viewer, &orders),
    }))
}

pub async fn get_sales_log(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<SalesLogResponse>, AppError> {
    let filter = relative_filter(query);
    let (users, orders) = load_report_orders(&state, &auth, &filter).await?;
    let names = names_by_id(&users);

    let total_revenue = orders.iter().map(|o| o.total_revenue).sum();
    let total_orders = orders.len();
    let orders = orders
        .into_iter()
        .map(|o| OrderResponse {
            sales_name: names.get(o.sales_id.as_str()).map(|n| n.to_string()),
            order: o,
        })
        .collect();

    Ok(Json(SalesLogResponse {
        period_label: period_label(&auth.viewer(), &filter),
        total_revenue,
        total_orders,
        orders,
    }))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let now = today();
    let month = query.month.unwrap_or(now.month());
    if !(1..=12).contains(&month) {
        return Err(AppError::validation("Month must be between 1 and 12"));
    }
    let filter = ReportFilter {
        branch: selected(query.branch),
        employee_id: selected(query.employee_id),
        ..ReportFilter::calendar(month, query.year.unwrap_or(now.year()))
    };

    let (users, orders) = load_report_orders(&state, &auth, &filter).await?;
    let viewer = auth.viewer();
    let rows = summary(&viewer, &users, &orders);

    Ok(Json(SummaryResponse {
        period_label: period_label(&viewer, &filter),
        total_revenue: rows.iter().map(|r| r.revenue).sum(),
        total_orders: orders.len(),
        total_quantity: rows.iter().map(|r| r.quantity).sum(),
        rows,
    }))
}
