use serde::{Deserialize, Serialize};

use super::order::OrderResponse;
use crate::services::analysis::Analysis;
use crate::services::reports::{Dashboard, Period, SummaryRow};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub period: Option<Period>,
    pub branch: Option<String>,
    pub employee_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub branch: Option<String>,
    pub employee_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub period: Option<Period>,
    pub branch: Option<String>,
}

/// Filter values of "All" (or blank) mean no filter.
pub fn selected(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && !v.eq_ignore_ascii_case("all"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub period_label: String,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesLogResponse {
    pub period_label: String,
    pub total_revenue: f64,
    pub total_orders: usize,
    pub orders: Vec<OrderResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub period_label: String,
    pub total_revenue: f64,
    pub total_orders: usize,
    pub total_quantity: i64,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub period_label: String,
    #[serde(flatten)]
    pub analysis: Analysis,
}

#[derive(Debug, Serialize)]
pub struct SyncRefreshResponse {
    pub users: bool,
    pub customers: bool,
    pub orders: bool,
}
