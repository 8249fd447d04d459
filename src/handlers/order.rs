use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use http::header;

use super::customer::{names_by_id, visible_customer};
use super::{fresh_id, today};
use crate::dtos::order::{
    CreateOrderRequest, DiscountLineRequest, IceCreamLineRequest, OrderPreviewResponse, OrderResponse, QuoteQuery,
    ToppingLineRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::catalog::list_price;
use crate::models::customer::Customer;
use crate::models::order::{IceCreamItem, Order, ToppingItem};
use crate::models::user::User;
use crate::services::order_calculator::{calculate_totals, line_total, OrderTotals};
use crate::services::quote::{build_quote, render_text, QuoteParties};
use crate::services::visibility::Scope;
use crate::state::AppState;

const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// A validated order that has not been saved yet.
struct Draft {
    order: Order,
    totals: OrderTotals,
    is_first_order: bool,
    gifts_cleared: bool,
    customer: Customer,
}

async fn build_draft(
    state: &AppState,
    auth: &AuthContext,
    users: &[User],
    req: CreateOrderRequest,
) -> Result<Draft, AppError> {
    let customer = visible_customer(state, auth, users, req.customer_id.trim()).await?;

    if req.ice_cream_items.is_empty() && req.topping_items.is_empty() {
        return Err(AppError::validation("Order needs at least one ice cream or topping line"));
    }
    let shipping = match req.shipping_cost {
        Some(s) if !s.is_finite() || s < 0.0 => {
            return Err(AppError::validation("Shipping cost must be a non-negative number"))
        }
        Some(s) => s,
        None => 0.0,
    };

    let stamp = fresh_id(|_| false);
    let ice_cream_items = ice_cream_lines(&stamp, req.ice_cream_items)?;
    let topping_items = topping_lines(&stamp, "tp", req.topping_items)?;
    let discount_items = discount_lines(&stamp, req.discount_items)?;

    let is_first_order = !state.records.has_orders_for(&customer.id).await?;
    let gifts_cleared = !is_first_order && !req.gift_items.is_empty();
    let gift_items = if is_first_order {
        topping_lines(&stamp, "gift", req.gift_items)?
    } else {
        if gifts_cleared {
            tracing::info!(customer_id = %customer.id, "Gift items dropped, customer already has orders");
        }
        Vec::new()
    };

    let totals = calculate_totals(&ice_cream_items, &topping_items, &discount_items, shipping);
    if !totals.final_amount.is_finite() {
        return Err(AppError::validation("Order total is out of range"));
    }

    let existing = state.records.orders().await?;
    let id = fresh_id(|candidate| existing.iter().any(|o| o.id == candidate));
    let sales_id = if customer.sales_id.trim().is_empty() {
        auth.user_id.clone()
    } else {
        customer.sales_id.clone()
    };

    let order = Order {
        id,
        sales_id,
        customer_id: customer.id.clone(),
        customer_name: customer.name.clone(),
        company_name: customer.company_name.clone(),
        date: req.date.unwrap_or_else(today),
        has_invoice: req.has_invoice,
        ice_cream_items,
        topping_items,
        discount_items,
        gift_items,
        total_ice_cream_revenue: totals.ice_cream_revenue,
        total_topping_revenue: totals.topping_revenue,
        total_revenue: totals.revenue,
        total_quantity: totals.total_quantity,
        shipping_cost: Some(totals.shipping_cost),
        final_amount: Some(totals.final_amount),
        deposit_amount: Some(totals.deposit),
    };

    Ok(Draft { order, totals, is_first_order, gifts_cleared, customer })
}

fn ice_cream_lines(stamp: &str, lines: Vec<IceCreamLineRequest>) -> Result<Vec<IceCreamItem>, AppError> {
    lines
        .into_iter()
        .enumerate()
        .map(|(idx, l)| {
            check_line(&l.flavor, l.quantity, "Flavor")?;
            let price = match l.price_per_unit {
                Some(p) if !p.is_finite() || p < 0.0 => {
                    return Err(AppError::validation("Price must be a non-negative number"))
                }
                Some(p) => p,
                None => list_price(l.line, l.size),
            };
            Ok(IceCreamItem {
                id: format!("ic_{stamp}_{idx}"),
                line: l.line,
                size: l.size,
                flavor: l.flavor.trim().to_string(),
                quantity: l.quantity,
                price_per_unit: price,
                total: checked_total(price, l.quantity)?,
            })
        })
        .collect()
}

fn discount_lines(stamp: &str, lines: Vec<DiscountLineRequest>) -> Result<Vec<IceCreamItem>, AppError> {
    lines
        .into_iter()
        .enumerate()
        .map(|(idx, l)| {
            check_line(&l.flavor, l.quantity, "Flavor")?;
            Ok(IceCreamItem {
                id: format!("disc_{stamp}_{idx}"),
                line: l.line,
                size: l.size,
                flavor: l.flavor.trim().to_string(),
                quantity: l.quantity,
                price_per_unit: 0.0,
                total: 0.0,
            })
        })
        .collect()
}

// Toppings and gifts
fn topping_lines(stamp: &str, prefix: &str, lines: Vec<ToppingLineRequest>) -> Result<Vec<ToppingItem>, AppError> {
    lines
        .into_iter()
        .enumerate()
        .map(|(idx, l)| {
            check_line(&l.name, l.quantity, "Item name")?;
            if l.unit.trim().is_empty() {
                return Err(AppError::validation("Unit is required"));
            }
            if !l.price_per_unit.is_finite() || l.price_per_unit < 0.0 {
                return Err(AppError::validation("Price must be a non-negative number"));
            }
            Ok(ToppingItem {
                id: format!("{prefix}_{stamp}_{idx}"),
                name: l.name.trim().to_string(),
                unit: l.unit.trim().to_string(),
                quantity: l.quantity,
                price_per_unit: l.price_per_unit,
                total: checked_total(l.price_per_unit, l.quantity)?,
            })
        })
        .collect()
}

fn check_line(label: &str, quantity: i64, what: &str) -> Result<(), AppError> {
    if label.trim().is_empty() {
        return Err(AppError::validation(format!("{what} is required")));
    }
    if quantity <= 0 {
        return Err(AppError::validation("Quantity must be greater than 0"));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(AppError::validation(format!("Quantity must not exceed {MAX_LINE_QUANTITY}")));
    }
    Ok(())
}

fn checked_total(price: f64, quantity: i64) -> Result<f64, AppError> {
    let total = line_total(price, quantity);
    if !total.is_finite() {
        return Err(AppError::validation("Line total is out of range"));
    }
    Ok(total)
}

fn display_name(users: &[User], id: &str) -> String {
    users.iter().find(|u| u.id == id).map(|u| u.full_name.clone()).unwrap_or_default()
}

// ==================== Handlers ====================

pub async fn create_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let users = state.records.users().await?;
    let draft = build_draft(&state, &auth, &users, req).await?;

    let saved = state.records.save_order(draft.order).await?;
    tracing::info!(
        order_id = %saved.id,
        customer_id = %saved.customer_id,
        final_amount = draft.totals.final_amount,
        "Order created"
    );

    let sales_name = names_by_id(&users).get(saved.sales_id.as_str()).map(|n| n.to_string());
    Ok((StatusCode::CREATED, Json(OrderResponse { order: saved, sales_name })))
}

pub async fn preview_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<OrderPreviewResponse>, AppError> {
    let users = state.records.users().await?;
    let draft = build_draft(&state, &auth, &users, req).await?;

    let quote = build_quote(
        &draft.order,
        &QuoteParties {
            customer: Some(&draft.customer),
            sales_name: display_name(&users, &draft.order.sales_id),
            author_name: display_name(&users, &auth.user_id),
        },
    );

    Ok(Json(OrderPreviewResponse {
        totals: draft.totals,
        is_first_order: draft.is_first_order,
        gifts_cleared: draft.gifts_cleared,
        order: draft.order,
        quote,
    }))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let users = state.records.users().await?;
    let scope = Scope::new(&auth.viewer(), &users);
    let mut orders = scope.orders(state.records.orders().await?);
    orders.sort_by(|a, b| b.date.cmp(&a.date));

    let names = names_by_id(&users);
    let result = orders
        .into_iter()
        .map(|o| OrderResponse {
            sales_name: names.get(o.sales_id.as_str()).map(|n| n.to_string()),
            order: o,
        })
        .collect();
    Ok(Json(result))
}

async fn visible_order(state: &AppState, auth: &AuthContext, users: &[User], id: &str) -> Result<Order, AppError> {
    let order = state
        .records
        .find_order(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    if !Scope::new(&auth.viewer(), users).allows_sales_id(&order.sales_id) {
        return Err(AppError::not_found("Order not found"));
    }
    Ok(order)
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let users = state.records.users().await?;
    let order = visible_order(&state, &auth, &users, &order_id).await?;
    let sales_name = names_by_id(&users).get(order.sales_id.as_str()).map(|n| n.to_string());
    Ok(Json(OrderResponse { order, sales_name }))
}

pub async fn get_order_quote(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(order_id): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<Response, AppError> {
    let users = state.records.users().await?;
    let order = visible_order(&state, &auth, &users, &order_id).await?;
    // Contact lines only when the customer is still in the caller's scope
    let scope = Scope::new(&auth.viewer(), &users);
    let customer = state
        .records
        .find_customer(&order.customer_id)
        .await?
        .filter(|c| scope.allows_sales_id(&c.sales_id));

    let document = build_quote(
        &order,
        &QuoteParties {
            customer: customer.as_ref(),
            sales_name: display_name(&users, &order.sales_id),
            author_name: display_name(&users, &auth.user_id),
        },
    );

    match query.format.as_deref() {
        Some("text") => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            render_text(&document),
        )
            .into_response()),
        _ => Ok(Json(document).into_response()),
    }
}
