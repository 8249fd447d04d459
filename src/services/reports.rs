//! Order filtering and aggregation behind the dashboard, sales log and
//! monthly summary.
//!
//! Every report starts from the viewer's [`Scope`], sorts by date (newest
//! first), then applies the time window and the admin/manager overrides.
//! Revenue figures are always `totalRevenue`, which excludes shipping.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::visibility::{Scope, Viewer};
use crate::models::order::Order;
use crate::models::user::User;

pub const TOP_CUSTOMERS: usize = 5;
pub const CHART_ORDERS: usize = 10;
const CHART_LABEL_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Week,
    #[default]
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Relative(Period),
    Calendar { month: u32, year: i32 },
}

impl TimeWindow {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match *self {
            TimeWindow::Relative(Period::Week) => date >= today - Duration::days(7),
            TimeWindow::Relative(Period::Month) => date.month() == today.month() && date.year() == today.year(),
            TimeWindow::Relative(Period::Year) => date.year() == today.year(),
            TimeWindow::Calendar { month, year } => date.month() == month && date.year() == year,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportFilter {
    pub window: TimeWindow,
    // Only honoured for admins
    pub branch: Option<String>,
    // Honoured for admins and managers
    pub employee_id: Option<String>,
}

impl ReportFilter {
    pub fn relative(period: Period) -> Self {
        Self { window: TimeWindow::Relative(period), branch: None, employee_id: None }
    }

    pub fn calendar(month: u32, year: i32) -> Self {
        Self { window: TimeWindow::Calendar { month, year }, branch: None, employee_id: None }
    }

    fn has_overrides(&self, viewer: &Viewer) -> bool {
        viewer.oversees_others() && (self.branch.is_some() || self.employee_id.is_some())
    }
}

pub fn period_label(viewer: &Viewer, filter: &ReportFilter) -> String {
    let mut label = match filter.window {
        TimeWindow::Calendar { month, year } => format!("Tháng {month}/{year}"),
        TimeWindow::Relative(Period::Week) => "Tuần này".to_string(),
        TimeWindow::Relative(Period::Month) => "Tháng này".to_string(),
        TimeWindow::Relative(Period::Year) => "Năm nay".to_string(),
    };
    if filter.has_overrides(viewer) {
        label.push_str(" (Có lọc nâng cao)");
    }
    label
}

/// Orders visible to `viewer` that pass `filter`, newest first.
pub fn filter_orders(
    viewer: &Viewer,
    users: &[User],
    orders: Vec<Order>,
    filter: &ReportFilter,
    today: NaiveDate,
) -> Vec<Order> {
    let scope = Scope::new(viewer, users);
    let branch_of: HashMap<&str, &str> = users.iter().map(|u| (u.id.as_str(), u.branch.as_str())).collect();

    let mut visible = scope.orders(orders);
    visible.sort_by(|a, b| b.date.cmp(&a.date));

    visible
        .into_iter()
        .filter(|o| filter.window.contains(o.date, today))
        .filter(|o| match (&filter.branch, viewer.is_admin()) {
            (Some(branch), true) => branch_of.get(o.sales_id.as_str()) == Some(&branch.as_str()),
            _ => true,
        })
        .filter(|o| match (&filter.employee_id, viewer.oversees_others()) {
            (Some(employee), true) => &o.sales_id == employee,
            _ => true,
        })
        .collect()
}

// ==================== Dashboard ====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub name: String,
    pub full_name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRanking {
    pub customer_id: String,
    pub name: String,
    pub sales_id: String,
    pub total_orders: usize,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub chart: Vec<ChartPoint>,
    pub top_customers: Vec<CustomerRanking>,
}

/// `orders` must already be filtered and sorted newest first.
pub fn dashboard(viewer: &Viewer, orders: &[Order]) -> Dashboard {
    let chart = orders
        .iter()
        .take(CHART_ORDERS)
        .rev()
        .map(|o| ChartPoint {
            name: format!("{}...", o.company_name.chars().take(CHART_LABEL_CHARS).collect::<String>()),
            full_name: o.company_name.clone(),
            value: o.total_revenue,
        })
        .collect();

    let top_customers = if viewer.oversees_others() {
        top_customers(orders, TOP_CUSTOMERS)
    } else {
        Vec::new()
    };

    Dashboard {
        total_revenue: orders.iter().map(|o| o.total_revenue).sum(),
        total_orders: orders.len(),
        chart,
        top_customers,
    }
}

/// Ranking by revenue; ties keep the customer seen first.
pub fn top_customers(orders: &[Order], limit: usize) -> Vec<CustomerRanking> {
    let mut groups: OrderedGroups<CustomerRanking> = OrderedGroups::default();
    for o in orders {
        let entry = groups.entry(&o.customer_id, || CustomerRanking {
            customer_id: o.customer_id.clone(),
            name: o.company_name.clone(),
            sales_id: o.sales_id.clone(),
            total_orders: 0,
            total_revenue: 0.0,
        });
        entry.total_orders += 1;
        entry.total_revenue += o.total_revenue;
    }

    let mut ranked = groups.into_values();
    sort_desc_by(&mut ranked, |r| r.total_revenue);
    ranked.truncate(limit);
    ranked
}

// ==================== Monthly summary ====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub key: String,
    pub name: String,
    pub sub: String,
    pub revenue: f64,
    pub orders: usize,
    pub quantity: i64,
}

/// Admins and managers get one row per employee, staff one row per customer.
pub fn summary(viewer: &Viewer, users: &[User], orders: &[Order]) -> Vec<SummaryRow> {
    let by_id: HashMap<&str, &User> = users.iter().map(|u| (u.id.as_str(), u)).collect();
    let mut groups: OrderedGroups<SummaryRow> = OrderedGroups::default();

    for o in orders {
        let row = if viewer.oversees_others() {
            groups.entry(&o.sales_id, || {
                let staff = by_id.get(o.sales_id.as_str());
                SummaryRow {
                    key: o.sales_id.clone(),
                    name: staff.map_or_else(|| "Unknown".to_string(), |u| u.full_name.clone()),
                    sub: staff.map(|u| u.branch.clone()).unwrap_or_default(),
                    revenue: 0.0,
                    orders: 0,
                    quantity: 0,
                }
            })
        } else {
            groups.entry(&o.customer_id, || SummaryRow {
                key: o.customer_id.clone(),
                name: o.company_name.clone(),
                sub: o.customer_name.clone(),
                revenue: 0.0,
                orders: 0,
                quantity: 0,
            })
        };
        row.revenue += o.total_revenue;
        row.orders += 1;
        row.quantity += o.purchased_ice_cream_quantity();
    }

    let mut rows = groups.into_values();
    sort_desc_by(&mut rows, |r| r.revenue);
    rows
}

// ==================== Helpers ====================

/// Aggregation buckets that remember first-insertion order.
pub(crate) struct OrderedGroups<V> {
    index: HashMap<String, usize>,
    values: Vec<V>,
}

impl<V> Default for OrderedGroups<V> {
    fn default() -> Self {
        Self { index: HashMap::new(), values: Vec::new() }
    }
}

impl<V> OrderedGroups<V> {
    pub(crate) fn entry(&mut self, key: &str, init: impl FnOnce() -> V) -> &mut V {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.values.push(init());
                self.index.insert(key.to_string(), self.values.len() - 1);
                self.values.len() - 1
            }
        };
        &mut self.values[idx]
    }

    pub(crate) fn into_values(self) -> Vec<V> {
        self.values
    }
}

/// Stable descending sort.
pub(crate) fn sort_desc_by<T, F: Fn(&T) -> f64>(items: &mut [T], key: F) {
    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::repository::test_support::{ice_cream, order, user};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn team() -> Vec<User> {
        vec![
            user("s1", Role::Staff, "HQ"),
            user("s2", Role::Staff, "HQ"),
            user("m1", Role::Manager, "HQ"),
            user("s3", Role::Staff, "North"),
            user("a1", Role::Admin, "HQ"),
        ]
    }

    fn viewer(id: &str) -> Viewer {
        let users = team();
        Viewer::from_user(users.iter().find(|u| u.id == id).unwrap())
    }

    #[test]
    fn week_window_is_last_seven_days_inclusive() {
        let today = d(2025, 6, 15);
        let week = TimeWindow::Relative(Period::Week);
        assert!(week.contains(d(2025, 6, 8), today));
        assert!(week.contains(d(2025, 6, 15), today));
        assert!(!week.contains(d(2025, 6, 7), today));
    }

    #[test]
    fn month_and_year_windows_follow_the_calendar() {
        let today = d(2025, 6, 15);
        assert!(TimeWindow::Relative(Period::Month).contains(d(2025, 6, 1), today));
        assert!(!TimeWindow::Relative(Period::Month).contains(d(2024, 6, 20), today));
        assert!(TimeWindow::Relative(Period::Year).contains(d(2025, 1, 1), today));
        assert!(!TimeWindow::Relative(Period::Year).contains(d(2024, 12, 31), today));
        assert!(TimeWindow::Calendar { month: 2, year: 2024 }.contains(d(2024, 2, 29), today));
    }

    #[test]
    fn filter_sorts_newest_first_and_applies_window() {
        let orders = vec![
            order("o1", "c1", "s1", d(2025, 6, 2), 10.0),
            order("o2", "c1", "s1", d(2025, 6, 10), 20.0),
            order("o3", "c1", "s1", d(2025, 5, 30), 30.0),
        ];
        let out = filter_orders(&viewer("s1"), &team(), orders, &ReportFilter::relative(Period::Month), d(2025, 6, 15));
        let ids: Vec<_> = out.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o2", "o1"]);
    }

    #[test]
    fn branch_override_only_applies_to_admins() {
        let orders = vec![
            order("o1", "c1", "s1", d(2025, 6, 2), 10.0),
            order("o2", "c2", "s3", d(2025, 6, 3), 20.0),
        ];
        let mut filter = ReportFilter::relative(Period::Year);
        filter.branch = Some("North".into());

        let admin = filter_orders(&viewer("a1"), &team(), orders.clone(), &filter, d(2025, 6, 15));
        assert_eq!(admin.len(), 1);
        assert_eq!(admin[0].id, "o2");

        // Manager of HQ ignores the branch override and keeps own branch scope.
        let manager = filter_orders(&viewer("m1"), &team(), orders, &filter, d(2025, 6, 15));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager[0].id, "o1");
    }

    #[test]
    fn employee_override_is_ignored_for_staff() {
        let orders = vec![
            order("o1", "c1", "s1", d(2025, 6, 2), 10.0),
            order("o2", "c2", "s2", d(2025, 6, 3), 20.0),
        ];
        let mut filter = ReportFilter::relative(Period::Year);
        filter.employee_id = Some("s2".into());

        assert_eq!(filter_orders(&viewer("s1"), &team(), orders.clone(), &filter, d(2025, 6, 15)).len(), 1);
        let managed = filter_orders(&viewer("m1"), &team(), orders, &filter, d(2025, 6, 15));
        assert_eq!(managed.len(), 1);
        assert_eq!(managed[0].sales_id, "s2");
    }

    #[test]
    fn top_customers_break_ties_by_first_seen() {
        let orders = vec![
            order("o1", "cA", "s1", d(2025, 6, 9), 100.0),
            order("o2", "cB", "s1", d(2025, 6, 8), 150.0),
            order("o3", "cA", "s1", d(2025, 6, 7), 50.0),
            order("o4", "cC", "s1", d(2025, 6, 6), 150.0),
            order("o5", "cD", "s1", d(2025, 6, 5), 10.0),
            order("o6", "cE", "s1", d(2025, 6, 4), 5.0),
            order("o7", "cF", "s1", d(2025, 6, 3), 1.0),
        ];
        let ranked = top_customers(&orders, TOP_CUSTOMERS);
        let ids: Vec<_> = ranked.iter().map(|r| r.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["cA", "cB", "cC", "cD", "cE"]);
        assert_eq!(ranked[0].total_orders, 2);
        assert_eq!(ranked[0].total_revenue, 150.0);
    }

    #[test]
    fn dashboard_chart_and_staff_ranking() {
        let mut long = order("o1", "c1", "s1", d(2025, 6, 9), 100.0);
        long.company_name = "Công ty TNHH Kem Ngon".into();
        let orders = vec![long, order("o2", "c2", "s1", d(2025, 6, 8), 40.0)];

        let staff_view = dashboard(&viewer("s1"), &orders);
        assert_eq!(staff_view.total_revenue, 140.0);
        assert_eq!(staff_view.total_orders, 2);
        assert!(staff_view.top_customers.is_empty());
        // chart is oldest-to-newest of the ten most recent
        assert_eq!(staff_view.chart[1].name, "Công ty TN...");
        assert_eq!(staff_view.chart[1].full_name, "Công ty TNHH Kem Ngon");

        let admin_view = dashboard(&viewer("a1"), &orders);
        assert_eq!(admin_view.top_customers.len(), 2);
    }

    #[test]
    fn dashboard_revenue_excludes_shipping() {
        let mut o = order("o1", "c1", "s1", d(2025, 6, 9), 540_000.0);
        o.shipping_cost = Some(30_000.0);
        o.final_amount = Some(570_000.0);
        assert_eq!(dashboard(&viewer("s1"), &[o]).total_revenue, 540_000.0);
    }

    #[test]
    fn summary_groups_by_employee_for_managers_and_by_customer_for_staff() {
        let mut with_discount = order("o2", "c2", "s1", d(2025, 6, 3), 200.0);
        with_discount.discount_items.push(ice_cream("Dâu", 4, 0.0));
        let orders = vec![
            order("o1", "c1", "s1", d(2025, 6, 2), 100.0),
            with_discount,
            order("o3", "c1", "ghost", d(2025, 6, 4), 500.0),
        ];

        let rows = summary(&viewer("a1"), &team(), &orders);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Unknown");
        assert_eq!(rows[0].sub, "");
        assert_eq!(rows[1].key, "s1");
        assert_eq!(rows[1].sub, "HQ");
        assert_eq!(rows[1].orders, 2);
        assert_eq!(rows[1].quantity, 2);

        let rows = summary(&viewer("s1"), &team(), &orders[..2]);
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["c2", "c1"]);
        assert_eq!(rows[0].name, "Công ty c2");
        assert_eq!(rows[0].sub, "Liên hệ c2");
    }

    #[test]
    fn period_labels() {
        let mut filter = ReportFilter::calendar(3, 2025);
        assert_eq!(period_label(&viewer("s1"), &filter), "Tháng 3/2025");
        filter.employee_id = Some("s1".into());
        assert_eq!(period_label(&viewer("s1"), &filter), "Tháng 3/2025");
        assert_eq!(period_label(&viewer("m1"), &filter), "Tháng 3/2025 (Có lọc nâng cao)");
        assert_eq!(period_label(&viewer("a1"), &ReportFilter::relative(Period::Week)), "Tuần này");
    }
}
