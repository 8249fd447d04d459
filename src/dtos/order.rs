use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::catalog::{IceCreamLine, IceCreamSize};
use crate::models::order::Order;
use crate::services::order_calculator::OrderTotals;
use crate::services::quote::QuoteDocument;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCreamLineRequest {
    pub line: IceCreamLine,
    pub size: IceCreamSize,
    pub flavor: String,
    pub quantity: i64,
    pub price_per_unit: Option<f64>, // Optional - list price for line/size if not provided
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountLineRequest {
    pub line: IceCreamLine,
    pub size: IceCreamSize,
    pub flavor: String,
    pub quantity: i64,
}

// Toppings and gifts share this shape
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingLineRequest {
    pub name: String,
    pub unit: String,
    pub quantity: i64,
    #[serde(default)]
    pub price_per_unit: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub has_invoice: bool,
    #[serde(default)]
    pub ice_cream_items: Vec<IceCreamLineRequest>,
    #[serde(default)]
    pub topping_items: Vec<ToppingLineRequest>,
    #[serde(default)]
    pub discount_items: Vec<DiscountLineRequest>,
    #[serde(default)]
    pub gift_items: Vec<ToppingLineRequest>,
    pub shipping_cost: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub sales_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPreviewResponse {
    pub totals: OrderTotals,
    pub is_first_order: bool,
    // Gift lines were submitted for a returning customer and dropped
    pub gifts_cleared: bool,
    pub order: Order,
    pub quote: QuoteDocument,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteQuery {
    pub format: Option<String>,
}
