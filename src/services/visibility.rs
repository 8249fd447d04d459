// Role-based record scope.
//   staff   -> own records
//   manager -> records of anyone in the manager's branch, plus own
//   admin   -> everything
use std::collections::HashSet;

use crate::models::customer::Customer;
use crate::models::order::Order;
use crate::models::user::{Role, User};

#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: String,
    pub role: Role,
    pub branch: String,
}

impl Viewer {
    pub fn from_user(user: &User) -> Self {
        Self { id: user.id.clone(), role: user.role, branch: user.branch.clone() }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn oversees_others(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Manager)
    }
}

pub struct Scope {
    viewer: Viewer,
    branch_ids: HashSet<String>,
}

impl Scope {
    pub fn new(viewer: &Viewer, users: &[User]) -> Self {
        let branch_ids = match viewer.role {
            Role::Manager => users
                .iter()
                .filter(|u| u.branch == viewer.branch)
                .map(|u| u.id.clone())
                .collect(),
            _ => HashSet::new(),
        };
        Self { viewer: viewer.clone(), branch_ids }
    }

    pub fn allows_sales_id(&self, sales_id: &str) -> bool {
        match self.viewer.role {
            Role::Admin => true,
            Role::Manager => sales_id == self.viewer.id || self.branch_ids.contains(sales_id),
            Role::Staff => sales_id == self.viewer.id,
        }
    }

    pub fn orders(&self, orders: Vec<Order>) -> Vec<Order> {
        orders.into_iter().filter(|o| self.allows_sales_id(&o.sales_id)).collect()
    }

    pub fn customers(&self, customers: Vec<Customer>) -> Vec<Customer> {
        customers.into_iter().filter(|c| self.allows_sales_id(&c.sales_id)).collect()
    }

    /// Users the viewer may pick in employee filters.
    pub fn employees<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        match self.viewer.role {
            Role::Admin => users.iter().collect(),
            Role::Manager => users.iter().filter(|u| u.branch == self.viewer.branch).collect(),
            Role::Staff => users.iter().filter(|u| u.id == self.viewer.id).collect(),
        }
    }

    /// Staff or managers the viewer may set as a customer's sales owner.
    pub fn can_assign_sales(&self, target: &User) -> bool {
        let assignable = matches!(target.role, Role::Staff | Role::Manager);
        match self.viewer.role {
            Role::Admin => assignable,
            Role::Manager => assignable && target.branch == self.viewer.branch,
            Role::Staff => target.id == self.viewer.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{order, user};
    use chrono::NaiveDate;

    fn team() -> Vec<User> {
        vec![
            user("s1", Role::Staff, "HQ"),
            user("s2", Role::Staff, "HQ"),
            user("m1", Role::Manager, "HQ"),
            user("s3", Role::Staff, "North"),
            user("m2", Role::Manager, "North"),
            user("a1", Role::Admin, "HQ"),
        ]
    }

    fn all_orders() -> Vec<Order> {
        let d = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        ["s1", "s2", "m1", "s3", "m2", "a1", "gone"]
            .iter()
            .enumerate()
            .map(|(i, sid)| order(&format!("o{i}"), "c", sid, d, 10.0))
            .collect()
    }

    fn visible(viewer_id: &str) -> Vec<String> {
        let users = team();
        let me = users.iter().find(|u| u.id == viewer_id).unwrap();
        let scope = Scope::new(&Viewer::from_user(me), &users);
        scope.orders(all_orders()).into_iter().map(|o| o.sales_id).collect()
    }

    #[test]
    fn staff_only_sees_own_records() {
        assert_eq!(visible("s1"), vec!["s1"]);
    }

    #[test]
    fn manager_sees_branch_union_own() {
        assert_eq!(visible("m1"), vec!["s1", "s2", "m1", "a1"]);
        assert_eq!(visible("m2"), vec!["s3", "m2"]);
    }

    #[test]
    fn admin_sees_everything_including_unknown_sales_ids() {
        assert_eq!(visible("a1").len(), 7);
    }

    #[test]
    fn assignment_rules() {
        let users = team();
        let find = |id: &str| users.iter().find(|u| u.id == id).unwrap().clone();
        let manager = Scope::new(&Viewer::from_user(&find("m1")), &users);
        assert!(manager.can_assign_sales(&find("s2")));
        assert!(!manager.can_assign_sales(&find("s3")));
        assert!(!manager.can_assign_sales(&find("a1")));

        let staff = Scope::new(&Viewer::from_user(&find("s1")), &users);
        assert!(staff.can_assign_sales(&find("s1")));
        assert!(!staff.can_assign_sales(&find("s2")));

        let admin = Scope::new(&Viewer::from_user(&find("a1")), &users);
        assert!(admin.can_assign_sales(&find("s3")));
        assert_eq!(admin.employees(&users).len(), 6);
        assert_eq!(manager.employees(&users).len(), 4);
    }
}
