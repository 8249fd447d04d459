use serde::{Deserialize, Serialize};

use super::lenient::{opt_string_or_number, string_or_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "Staff")]
    Staff,
    #[serde(alias = "Manager")]
    Manager,
    #[serde(alias = "Admin")]
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

// Mirrors a row of the NHAN_VIEN sheet. Passwords are stored as the sheet holds them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub full_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub position: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub username: String,
    #[serde(default, deserialize_with = "opt_string_or_number", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    #[serde(default, deserialize_with = "string_or_number")]
    pub branch: String,
}

impl User {
    pub fn matches_credentials(&self, username: &str, password: &str) -> bool {
        !self.username.is_empty()
            && self.username.to_lowercase() == username.to_lowercase()
            && self.password.as_deref() == Some(password)
    }
}
