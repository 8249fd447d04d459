// Per-customer aggregates computed at read time; never persisted.
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::catalog::{IceCreamLine, IceCreamSize};
use crate::models::customer::Customer;
use crate::models::order::Order;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseStats {
    pub total_orders: usize,
    pub total_ice_cream_revenue: f64,
    pub total_topping_revenue: f64,
    // Purchased boxes only; discount and gift items are excluded
    pub total_boxes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_purchase_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_purchase_date: Option<NaiveDate>,
}

impl PurchaseStats {
    fn add(&mut self, order: &Order) {
        self.total_orders += 1;
        self.total_ice_cream_revenue += order.total_ice_cream_revenue;
        self.total_topping_revenue += order.total_topping_revenue;
        self.total_boxes += order.purchased_ice_cream_quantity();
        self.first_purchase_date = Some(match self.first_purchase_date {
            Some(d) if d <= order.date => d,
            _ => order.date,
        });
        self.last_purchase_date = Some(match self.last_purchase_date {
            Some(d) if d >= order.date => d,
            _ => order.date,
        });
    }
}

pub fn stats_by_customer(orders: &[Order]) -> HashMap<&str, PurchaseStats> {
    let mut stats: HashMap<&str, PurchaseStats> = HashMap::new();
    for o in orders {
        stats.entry(o.customer_id.as_str()).or_default().add(o);
    }
    stats
}

#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    // YYYY-MM
    pub first_month: Option<String>,
    pub last_month: Option<String>,
    pub province: Option<String>,
}

impl CustomerFilter {
    pub fn matches(&self, customer: &Customer, stats: &PurchaseStats) -> bool {
        if let Some(month) = &self.first_month {
            if !same_month(stats.first_purchase_date, month) {
                return false;
            }
        }
        if let Some(month) = &self.last_month {
            if !same_month(stats.last_purchase_date, month) {
                return false;
            }
        }
        if let Some(province) = &self.province {
            if !customer.address.to_lowercase().contains(&province.trim().to_lowercase()) {
                return false;
            }
        }
        true
    }
}

fn same_month(date: Option<NaiveDate>, month: &str) -> bool {
    date.is_some_and(|d| d.format("%Y-%m").to_string() == month.trim())
}

/// Purchased boxes by product line and size, zero-filled.
#[derive(Debug, Clone, Serialize)]
pub struct LineSizeRow {
    pub line: IceCreamLine,
    pub sizes: Vec<(IceCreamSize, i64)>,
}

pub fn line_size_matrix(orders: &[Order]) -> Vec<LineSizeRow> {
    let mut counts: HashMap<(IceCreamLine, IceCreamSize), i64> = HashMap::new();
    for item in orders.iter().flat_map(|o| o.ice_cream_items.iter()) {
        *counts.entry((item.line, item.size)).or_default() += item.quantity;
    }
    IceCreamLine::ALL
        .iter()
        .map(|&line| LineSizeRow {
            line,
            sizes: IceCreamSize::ALL
                .iter()
                .map(|&size| (size, counts.get(&(line, size)).copied().unwrap_or(0)))
                .collect(),
        })
        .collect()
}
