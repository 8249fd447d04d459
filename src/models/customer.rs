use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient::{self, opt_string_or_number, string_or_number};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    // Sales staff responsible for this customer
    #[serde(default, deserialize_with = "string_or_number")]
    pub sales_id: String,
    // Rows without a creation date are treated as created on the day they are read
    #[serde(default = "first_seen", with = "lenient::date")]
    pub created_date: NaiveDate,
    #[serde(default, deserialize_with = "string_or_number")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub company_name: String,
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: String,
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub address: String,
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub rep_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub rep_phone: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub rep_position: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn first_seen() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl Customer {
    /// Addresses are stored as "specific, ward, district, province"; the province is the
    /// last segment.
    pub fn province(&self) -> Option<&str> {
        if self.address.trim().is_empty() {
            return None;
        }
        self.address.rsplit(',').next().map(str::trim)
    }
}
