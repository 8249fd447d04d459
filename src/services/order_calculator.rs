//! Order totals.
//!
//! Revenue counts only purchased ice cream and toppings. Discount boxes are
//! free and gifts carry a display value, so neither reaches revenue or the
//! payable amount. Shipping is paid by the customer but is not revenue.

use serde::Serialize;

use crate::models::order::{IceCreamItem, ToppingItem};

pub const DEPOSIT_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub ice_cream_revenue: f64,
    pub topping_revenue: f64,
    pub revenue: f64,
    pub shipping_cost: f64,
    pub final_amount: f64,
    pub deposit: f64,
    pub total_quantity: i64,
}

pub fn calculate_totals(
    ice_cream: &[IceCreamItem],
    toppings: &[ToppingItem],
    discounts: &[IceCreamItem],
    shipping_cost: f64,
) -> OrderTotals {
    let ice_cream_revenue: f64 = ice_cream.iter().map(|i| i.total).sum();
    let topping_revenue: f64 = toppings.iter().map(|i| i.total).sum();
    let revenue = ice_cream_revenue + topping_revenue;

    let shipping_cost = if shipping_cost.is_finite() { shipping_cost } else { 0.0 };
    let final_amount = revenue + shipping_cost;

    let total_quantity = ice_cream
        .iter()
        .chain(discounts)
        .fold(0i64, |acc, i| acc.saturating_add(i.quantity));

    OrderTotals {
        ice_cream_revenue,
        topping_revenue,
        revenue,
        shipping_cost,
        final_amount,
        deposit: final_amount * DEPOSIT_RATE,
        total_quantity,
    }
}

pub fn line_total(price_per_unit: f64, quantity: i64) -> f64 {
    price_per_unit * quantity as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{ice_cream, topping};

    #[test]
    fn worked_example() {
        let totals = calculate_totals(
            &[ice_cream("Socola", 10, 50_000.0)],
            &[topping("Ốc quế", 2, 20_000.0)],
            &[],
            30_000.0,
        );
        assert_eq!(totals.ice_cream_revenue, 500_000.0);
        assert_eq!(totals.topping_revenue, 40_000.0);
        assert_eq!(totals.revenue, 540_000.0);
        assert_eq!(totals.final_amount, 570_000.0);
        assert_eq!(totals.deposit, 285_000.0);
        assert_eq!(totals.total_quantity, 10);
    }

    #[test]
    fn discounts_add_boxes_but_no_revenue() {
        let mut free = ice_cream("Dâu", 3, 0.0);
        free.total = 0.0;
        let totals = calculate_totals(&[ice_cream("Dâu", 5, 55_000.0)], &[], &[free], 0.0);
        assert_eq!(totals.revenue, 275_000.0);
        assert_eq!(totals.final_amount, 275_000.0);
        assert_eq!(totals.total_quantity, 8);
    }

    #[test]
    fn final_amount_and_deposit_invariants_hold() {
        let cases = [
            (vec![ice_cream("A", 1, 12_000.0)], vec![], 0.0),
            (vec![ice_cream("A", 7, 65_000.0), ice_cream("B", 3, 290_000.0)], vec![topping("Muỗng", 100, 300.0)], 45_000.0),
            (vec![], vec![topping("Ly", 9, 1_500.0)], 15_000.0),
        ];
        for (ic, tp, ship) in cases {
            let t = calculate_totals(&ic, &tp, &[], ship);
            assert_eq!(t.final_amount, t.ice_cream_revenue + t.topping_revenue + ship);
            assert_eq!(t.deposit, t.final_amount / 2.0);
        }
    }

    #[test]
    fn non_finite_shipping_counts_as_zero() {
        let t = calculate_totals(&[ice_cream("A", 2, 10_000.0)], &[], &[], f64::NAN);
        assert_eq!(t.shipping_cost, 0.0);
        assert_eq!(t.final_amount, 20_000.0);
    }
}
