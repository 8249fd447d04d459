use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{fresh_id, today};
use crate::dtos::customer::{
    CustomerDetailResponse, CustomerListQuery, CustomerSummary, EligibilityResponse, UpsertCustomerRequest,
};
use crate::dtos::report::selected;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::customer::Customer;
use crate::models::user::User;
use crate::services::customer_stats::{line_size_matrix, stats_by_customer, CustomerFilter};
use crate::services::visibility::Scope;
use crate::state::AppState;

pub(crate) fn names_by_id(users: &[User]) -> HashMap<&str, &str> {
    users.iter().map(|u| (u.id.as_str(), u.full_name.as_str())).collect()
}

// ==================== Queries ====================

pub async fn list_customers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<CustomerListQuery>,
) -> Result<Json<Vec<CustomerSummary>>, AppError> {
    let users = state.records.users().await?;
    let scope = Scope::new(&auth.viewer(), &users);
    let customers = scope.customers(state.records.customers().await?);
    let orders = state.records.orders().await?;
    let stats = stats_by_customer(&orders);
    let names = names_by_id(&users);

    let filter = CustomerFilter {
        first_month: selected(query.first_month),
        last_month: selected(query.last_month),
        province: selected(query.province),
    };

    let mut result = Vec::new();
    for customer in customers {
        let customer_stats = stats.get(customer.id.as_str()).cloned().unwrap_or_default();
        if !filter.matches(&customer, &customer_stats) {
            continue;
        }
        result.push(CustomerSummary {
            sales_name: names.get(customer.sales_id.as_str()).map(|n| n.to_string()),
            customer,
            stats: customer_stats,
        });
    }

    Ok(Json(result))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(customer_id): Path<String>,
) -> Result<Json<CustomerDetailResponse>, AppError> {
    let users = state.records.users().await?;
    let customer = visible_customer(&state, &auth, &users, &customer_id).await?;

    let mut history: Vec<_> = state
        .records
        .orders()
        .await?
        .into_iter()
        .filter(|o| o.customer_id == customer.id)
        .collect();
    history.sort_by(|a, b| b.date.cmp(&a.date));

    let stats = stats_by_customer(&history).remove(customer.id.as_str()).unwrap_or_default();
    let line_size_stats = line_size_matrix(&history);
    let sales_name = names_by_id(&users).get(customer.sales_id.as_str()).map(|n| n.to_string());

    Ok(Json(CustomerDetailResponse {
        summary: CustomerSummary { customer, stats, sales_name },
        history,
        line_size_stats,
    }))
}

pub async fn check_eligibility(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(customer_id): Path<String>,
) -> Result<Json<EligibilityResponse>, AppError> {
    let users = state.records.users().await?;
    let customer = visible_customer(&state, &auth, &users, &customer_id).await?;
    let is_first_order = !state.records.has_orders_for(&customer.id).await?;

    Ok(Json(EligibilityResponse { customer_id: customer.id, is_first_order }))
}

/// Customer by id, but only when the caller's scope covers its sales owner.
pub(crate) async fn visible_customer(
    state: &AppState,
    auth: &AuthContext,
    users: &[User],
    customer_id: &str,
) -> Result<Customer, AppError> {
    let customer = state
        .records
        .find_customer(customer_id)
        .await?
        .ok_or_else(|| AppError::not_found("Customer not found"))?;

    if !Scope::new(&auth.viewer(), users).allows_sales_id(&customer.sales_id) {
        return Err(AppError::not_found("Customer not found"));
    }
    Ok(customer)
}

// ==================== Mutations ====================

pub async fn create_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpsertCustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let users = state.records.users().await?;
    let sales_id = resolve_sales_id(&auth, &users, req.sales_id.as_deref(), &auth.user_id)?;
    let address = resolve_address(&req)?.unwrap_or_default();
    validate_contact(&req)?;

    let existing = state.records.customers().await?;
    let id = fresh_id(|candidate| existing.iter().any(|c| c.id == candidate));

    let customer = Customer {
        id,
        sales_id,
        created_date: req.created_date.unwrap_or_else(today),
        name: req.name.trim().to_string(),
        company_name: req.company_name.trim().to_string(),
        position: trimmed(req.position),
        phone: req.phone.trim().to_string(),
        email: trimmed(req.email),
        address,
        rep_name: trimmed(req.rep_name),
        rep_phone: trimmed(req.rep_phone),
        rep_position: trimmed(req.rep_position),
        notes: trimmed(req.notes),
    };

    let saved = state.records.save_customer(customer).await?;
    tracing::info!(customer_id = %saved.id, sales_id = %saved.sales_id, "Customer created");
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(customer_id): Path<String>,
    Json(req): Json<UpsertCustomerRequest>,
) -> Result<Json<Customer>, AppError> {
    let users = state.records.users().await?;
    let existing = visible_customer(&state, &auth, &users, &customer_id).await?;
    let sales_id = resolve_sales_id(&auth, &users, req.sales_id.as_deref(), &existing.sales_id)?;
    let address = resolve_address(&req)?.unwrap_or_else(|| existing.address.clone());
    validate_contact(&req)?;

    let customer = Customer {
        id: existing.id,
        sales_id,
        created_date: req.created_date.unwrap_or(existing.created_date),
        name: req.name.trim().to_string(),
        company_name: req.company_name.trim().to_string(),
        position: trimmed(req.position),
        phone: req.phone.trim().to_string(),
        email: trimmed(req.email),
        address,
        rep_name: trimmed(req.rep_name),
        rep_phone: trimmed(req.rep_phone),
        rep_position: trimmed(req.rep_position),
        notes: trimmed(req.notes),
    };

    let saved = state.records.save_customer(customer).await?;
    tracing::info!(customer_id = %saved.id, "Customer updated");
    Ok(Json(saved))
}

// ==================== Validation ====================

fn validate_contact(req: &UpsertCustomerRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("Contact name is required"));
    }
    if req.company_name.trim().is_empty() {
        return Err(AppError::validation("Company name is required"));
    }
    if req.phone.trim().is_empty() {
        return Err(AppError::validation("Phone is required"));
    }
    Ok(())
}

/// `None` when the request carries no address at all.
fn resolve_address(req: &UpsertCustomerRequest) -> Result<Option<String>, AppError> {
    if let Some(parts) = &req.address_parts {
        return parts
            .compose()
            .map(Some)
            .ok_or_else(|| AppError::validation("Address needs specific address, ward, district and province"));
    }
    Ok(trimmed(req.address.clone()))
}

fn resolve_sales_id(
    auth: &AuthContext,
    users: &[User],
    requested: Option<&str>,
    fallback: &str,
) -> Result<String, AppError> {
    let requested = match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(id) => id,
        None => return Ok(fallback.to_string()),
    };
    if requested == fallback {
        return Ok(requested.to_string());
    }

    let target = users
        .iter()
        .find(|u| u.id == requested)
        .ok_or_else(|| AppError::validation("Unknown sales employee"))?;
    if !Scope::new(&auth.viewer(), users).can_assign_sales(target) {
        return Err(AppError::forbidden("Not allowed to assign this employee"));
    }
    Ok(target.id.clone())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
