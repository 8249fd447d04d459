// Product mix and customer geography.
use chrono::NaiveDate;
use serde::Serialize;

use super::reports::{filter_orders, sort_desc_by, OrderedGroups, Period, ReportFilter};
use super::visibility::Viewer;
use crate::models::customer::Customer;
use crate::models::order::Order;
use crate::models::user::User;

pub const TOP_PRODUCTS: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NamedCount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub top_flavors: Vec<NamedCount>,
    pub top_toppings: Vec<NamedCount>,
    // Admin only; empty otherwise
    pub locations: Vec<NamedCount>,
    pub total_provinces: usize,
    pub total_agents: usize,
}

pub fn analyze(
    viewer: &Viewer,
    users: &[User],
    orders: Vec<Order>,
    customers: &[Customer],
    period: Period,
    branch: Option<String>,
    today: NaiveDate,
) -> Analysis {
    let filter = ReportFilter { branch, ..ReportFilter::relative(period) };
    let orders = filter_orders(viewer, users, orders, &filter, today);

    let top_flavors = top_counts(
        orders
            .iter()
            .flat_map(|o| o.ice_cream_items.iter().map(|i| (i.flavor.as_str(), i.quantity))),
        TOP_PRODUCTS,
    );
    let top_toppings = top_counts(
        orders
            .iter()
            .flat_map(|o| o.topping_items.iter().map(|t| (t.name.as_str(), t.quantity))),
        TOP_PRODUCTS,
    );

    let (locations, total_agents) = if viewer.is_admin() {
        let provinces = customers.iter().filter_map(|c| c.province()).map(|p| (p, 1));
        (top_counts(provinces, usize::MAX), customers.len())
    } else {
        (Vec::new(), 0)
    };

    Analysis {
        top_flavors,
        top_toppings,
        total_provinces: locations.len(),
        locations,
        total_agents,
    }
}

fn top_counts<'a>(entries: impl Iterator<Item = (&'a str, i64)>, limit: usize) -> Vec<NamedCount> {
    let mut groups: OrderedGroups<NamedCount> = OrderedGroups::default();
    for (name, qty) in entries {
        groups
            .entry(name, || NamedCount { name: name.to_string(), value: 0 })
            .value += qty;
    }
    let mut counts = groups.into_values();
    sort_desc_by(&mut counts, |c| c.value as f64);
    counts.truncate(limit);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::repository::test_support::{customer, ice_cream, order, topping, user};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn team() -> Vec<User> {
        vec![
            user("s1", Role::Staff, "HQ"),
            user("s2", Role::Staff, "North"),
            user("a1", Role::Admin, "HQ"),
        ]
    }

    fn sample_orders() -> Vec<Order> {
        let mut o1 = order("o1", "c1", "s1", today(), 0.0);
        o1.ice_cream_items = vec![ice_cream("Dâu", 5, 1.0), ice_cream("Socola", 2, 1.0)];
        o1.topping_items = vec![topping("Ốc quế", 10, 1.0)];
        let mut o2 = order("o2", "c2", "s2", today(), 0.0);
        o2.ice_cream_items = vec![ice_cream("Socola", 4, 1.0), ice_cream("Vani", 1, 1.0)];
        vec![o1, o2]
    }

    #[test]
    fn flavors_are_ranked_by_quantity() {
        let admin = Viewer::from_user(&team()[2]);
        let result = analyze(&admin, &team(), sample_orders(), &[], Period::Month, None, today());
        assert_eq!(
            result.top_flavors,
            vec![
                NamedCount { name: "Socola".into(), value: 6 },
                NamedCount { name: "Dâu".into(), value: 5 },
                NamedCount { name: "Vani".into(), value: 1 },
            ]
        );
        assert_eq!(result.top_toppings[0].value, 10);
    }

    #[test]
    fn staff_analysis_is_scoped_and_has_no_locations() {
        let staff = Viewer::from_user(&team()[0]);
        let customers = vec![customer("c1", "s1", "1 A, B, C, Hà Nội")];
        let result = analyze(&staff, &team(), sample_orders(), &customers, Period::Month, None, today());
        assert_eq!(result.top_flavors[0].name, "Dâu");
        assert!(result.locations.is_empty());
        assert_eq!(result.total_agents, 0);
    }

    #[test]
    fn admin_branch_filter_and_locations() {
        let admin = Viewer::from_user(&team()[2]);
        let customers = vec![
            customer("c1", "s1", "1 A, B, C, Hà Nội"),
            customer("c2", "s2", "2 A, B, C, Đà Nẵng"),
            customer("c3", "s2", "3 A, B, C,  Hà Nội "),
            customer("c4", "s2", ""),
        ];
        let result = analyze(&admin, &team(), sample_orders(), &customers, Period::Month, Some("North".into()), today());
        assert_eq!(result.top_flavors[0].name, "Socola");
        assert_eq!(result.top_flavors[0].value, 4);
        assert_eq!(result.locations[0], NamedCount { name: "Hà Nội".into(), value: 2 });
        assert_eq!(result.total_provinces, 2);
        assert_eq!(result.total_agents, 4);
    }
}
