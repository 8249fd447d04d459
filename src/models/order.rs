use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::catalog::{IceCreamLine, IceCreamSize};
use super::lenient::{self, bool_or_string, int_or_string, number_or_string, opt_number_or_string, string_or_number, vec_or_null};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCreamItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub line: IceCreamLine,
    pub size: IceCreamSize,
    #[serde(deserialize_with = "string_or_number")]
    pub flavor: String,
    #[serde(deserialize_with = "int_or_string")]
    pub quantity: i64,
    #[serde(deserialize_with = "number_or_string")]
    pub price_per_unit: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub unit: String,
    #[serde(deserialize_with = "int_or_string")]
    pub quantity: i64,
    #[serde(deserialize_with = "number_or_string")]
    pub price_per_unit: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub sales_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub customer_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub company_name: String,
    #[serde(with = "lenient::date")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub has_invoice: bool,

    #[serde(default, deserialize_with = "vec_or_null")]
    pub ice_cream_items: Vec<IceCreamItem>,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub topping_items: Vec<ToppingItem>,
    // Free ice cream, always priced at zero
    #[serde(default, deserialize_with = "vec_or_null")]
    pub discount_items: Vec<IceCreamItem>,
    // First-order gifts, carry their display value
    #[serde(default, deserialize_with = "vec_or_null")]
    pub gift_items: Vec<ToppingItem>,

    #[serde(default, deserialize_with = "number_or_string")]
    pub total_ice_cream_revenue: f64,
    #[serde(default, deserialize_with = "number_or_string")]
    pub total_topping_revenue: f64,
    #[serde(default, deserialize_with = "number_or_string")]
    pub total_revenue: f64,
    #[serde(default, deserialize_with = "int_or_string")]
    pub total_quantity: i64,

    #[serde(default, deserialize_with = "opt_number_or_string", skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<f64>,
    #[serde(default, deserialize_with = "opt_number_or_string", skip_serializing_if = "Option::is_none")]
    pub final_amount: Option<f64>,
    #[serde(default, deserialize_with = "opt_number_or_string", skip_serializing_if = "Option::is_none")]
    pub deposit_amount: Option<f64>,
}

impl Order {
    pub fn shipping(&self) -> f64 {
        self.shipping_cost.unwrap_or(0.0)
    }

    // Orders saved before shipping was tracked carry no final amount.
    pub fn payable_amount(&self) -> f64 {
        self.final_amount
            .unwrap_or(self.total_ice_cream_revenue + self.total_topping_revenue + self.shipping())
    }

    /// Purchased boxes only; discount boxes are excluded.
    pub fn purchased_ice_cream_quantity(&self) -> i64 {
        self.ice_cream_items.iter().map(|i| i.quantity).sum()
    }

    pub fn discount_value(&self) -> f64 {
        self.discount_items.iter().map(|i| i.total).sum()
    }

    pub fn gift_value(&self) -> f64 {
        self.gift_items.iter().map(|i| i.total).sum()
    }
}
