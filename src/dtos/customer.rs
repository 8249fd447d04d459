use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::customer::Customer;
use crate::models::order::Order;
use crate::services::customer_stats::{LineSizeRow, PurchaseStats};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListQuery {
    pub first_month: Option<String>,
    pub last_month: Option<String>,
    pub province: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressParts {
    pub specific: String,
    pub ward: String,
    pub district: String,
    pub province: String,
}

impl AddressParts {
    /// `None` unless every part is filled in.
    pub fn compose(&self) -> Option<String> {
        let parts = [&self.specific, &self.ward, &self.district, &self.province];
        if parts.iter().any(|p| p.trim().is_empty()) {
            return None;
        }
        Some(parts.iter().map(|p| p.trim()).collect::<Vec<_>>().join(", "))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCustomerRequest {
    pub sales_id: Option<String>,
    pub created_date: Option<NaiveDate>,
    pub name: String,
    pub company_name: String,
    pub position: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    // Either a full address or its parts
    pub address: Option<String>,
    pub address_parts: Option<AddressParts>,
    pub rep_name: Option<String>,
    pub rep_phone: Option<String>,
    pub rep_position: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    #[serde(flatten)]
    pub customer: Customer,
    #[serde(flatten)]
    pub stats: PurchaseStats,
    pub sales_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetailResponse {
    #[serde(flatten)]
    pub summary: CustomerSummary,
    // Newest first
    pub history: Vec<Order>,
    pub line_size_stats: Vec<LineSizeRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub customer_id: String,
    pub is_first_order: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parts_compose_only_when_complete() {
        let parts = AddressParts {
            specific: " 12 Lê Lợi ".into(),
            ward: "Phường Bến Nghé".into(),
            district: "Quận 1".into(),
            province: "Thành phố Hồ Chí Minh".into(),
        };
        assert_eq!(
            parts.compose().as_deref(),
            Some("12 Lê Lợi, Phường Bến Nghé, Quận 1, Thành phố Hồ Chí Minh")
        );
        let partial = AddressParts { ward: String::new(), ..parts };
        assert_eq!(partial.compose(), None);
    }
}
