// Typed access to the three collections. Every mutation rewrites the whole
// collection locally, then pushes the single changed record to the sheet.
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::database::{LocalStore, KEY_CUSTOMERS, KEY_ORDERS, KEY_USERS};
use crate::error::AppError;
use crate::models::customer::Customer;
use crate::models::order::Order;
use crate::models::user::User;
use crate::sync::{SheetClient, SyncAction};

#[derive(Clone)]
pub struct Records {
    store: LocalStore,
    sheet: SheetClient,
    write_lock: Arc<Mutex<()>>,
}

impl Records {
    pub fn new(store: LocalStore, sheet: SheetClient) -> Self {
        Self { store, sheet, write_lock: Arc::new(Mutex::new(())) }
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AppError> {
        match self.store.get(key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn persist<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), AppError> {
        let raw = serde_json::to_string(items)?;
        self.store.set(key, raw).await
    }

    // ==================== Users ====================

    pub async fn users(&self) -> Result<Vec<User>, AppError> {
        self.load(KEY_USERS).await
    }

    pub async fn find_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().await?.into_iter().find(|u| u.id == id))
    }

    /// Returns false when no user has this id.
    pub async fn update_user_password(&self, user_id: &str, new_password: &str) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.users().await?;
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        user.password = Some(new_password.to_string());
        let changed = user.clone();

        self.persist(KEY_USERS, &users).await?;
        self.sheet.push(SyncAction::Users, &changed);
        Ok(true)
    }

    // ==================== Customers ====================

    pub async fn customers(&self) -> Result<Vec<Customer>, AppError> {
        self.load(KEY_CUSTOMERS).await
    }

    pub async fn find_customer(&self, id: &str) -> Result<Option<Customer>, AppError> {
        Ok(self.customers().await?.into_iter().find(|c| c.id == id))
    }

    /// Upsert by id.
    pub async fn save_customer(&self, customer: Customer) -> Result<Customer, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut customers = self.customers().await?;
        match customers.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => *existing = customer.clone(),
            None => customers.push(customer.clone()),
        }

        self.persist(KEY_CUSTOMERS, &customers).await?;
        self.sheet.push(SyncAction::Customers, &customer);
        Ok(customer)
    }

    // ==================== Orders ====================

    pub async fn orders(&self) -> Result<Vec<Order>, AppError> {
        self.load(KEY_ORDERS).await
    }

    pub async fn find_order(&self, id: &str) -> Result<Option<Order>, AppError> {
        Ok(self.orders().await?.into_iter().find(|o| o.id == id))
    }

    pub async fn has_orders_for(&self, customer_id: &str) -> Result<bool, AppError> {
        Ok(self.orders().await?.iter().any(|o| o.customer_id == customer_id))
    }

    /// Orders are append-only. Under the write lock a numeric id that is already taken
    /// moves to the next free number, and gift lines are dropped when the customer
    /// already has orders.
    pub async fn save_order(&self, mut order: Order) -> Result<Order, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut orders = self.orders().await?;

        if orders.iter().any(|o| o.id == order.id) {
            let mut next = order
                .id
                .parse::<i64>()
                .map_err(|_| AppError::conflict(format!("Order {} already exists", order.id)))?;
            while orders.iter().any(|o| o.id == next.to_string()) {
                next += 1;
            }
            order.id = next.to_string();
        }

        if !order.gift_items.is_empty() && orders.iter().any(|o| o.customer_id == order.customer_id) {
            tracing::info!(customer_id = %order.customer_id, "Gift items dropped, customer already has orders");
            order.gift_items.clear();
        }

        orders.push(order.clone());

        self.persist(KEY_ORDERS, &orders).await?;
        self.sheet.push(SyncAction::Orders, &order);
        Ok(order)
    }

    // ==================== Cloud refresh ====================

    pub async fn refresh_users_from_cloud(&self) -> Result<bool, AppError> {
        self.refresh::<User>(SyncAction::Users, KEY_USERS).await
    }

    pub async fn refresh_customers_from_cloud(&self) -> Result<bool, AppError> {
        self.refresh::<Customer>(SyncAction::Customers, KEY_CUSTOMERS).await
    }

    pub async fn refresh_orders_from_cloud(&self) -> Result<bool, AppError> {
        self.refresh::<Order>(SyncAction::Orders, KEY_ORDERS).await
    }

    /// Replaces the local collection when the sheet returns at least one row.
    /// Rows that fail to decode are skipped with a warning.
    async fn refresh<T: DeserializeOwned + Serialize>(&self, action: SyncAction, key: &str) -> Result<bool, AppError> {
        if !self.sheet.is_enabled() {
            return Ok(false);
        }
        let rows = self.sheet.fetch(action).await;
        let items = decode_rows::<T>(action, rows);
        if items.is_empty() {
            return Ok(false);
        }

        let _guard = self.write_lock.lock().await;
        self.persist(key, &items).await?;
        tracing::info!(action = action.fetch_action(), count = items.len(), "Local collection refreshed from sheet");
        Ok(true)
    }
}

fn decode_rows<T: DeserializeOwned>(action: SyncAction, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(idx, row)| match serde_json::from_value::<T>(row) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(action = action.fetch_action(), row = idx, error = %e, "Skipping undecodable sheet row");
                None
            }
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::user::Role;
    use chrono::NaiveDate;

    fn records() -> Records {
        Records::new(LocalStore::in_memory(), SheetClient::disabled())
    }

    #[tokio::test]
    async fn empty_store_reads_as_empty_collections() {
        let records = records();
        assert!(records.users().await.unwrap().is_empty());
        assert!(records.customers().await.unwrap().is_empty());
        assert!(records.orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_customer_upserts_by_id() {
        let records = records();
        records.save_customer(customer("c1", "u1", "Hà Nội")).await.unwrap();
        records.save_customer(customer("c2", "u1", "Huế")).await.unwrap();

        let mut edited = customer("c1", "u2", "Đà Nẵng");
        edited.notes = Some("Giao buổi sáng".into());
        records.save_customer(edited).await.unwrap();

        let all = records.customers().await.unwrap();
        assert_eq!(all.len(), 2);
        let c1 = records.find_customer("c1").await.unwrap().unwrap();
        assert_eq!(c1.sales_id, "u2");
        assert_eq!(c1.address, "Đà Nẵng");
        assert_eq!(c1.notes.as_deref(), Some("Giao buổi sáng"));
    }

    #[tokio::test]
    async fn orders_are_append_only() {
        let records = records();
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        records.save_order(order("o1", "c1", "u1", date, 100.0)).await.unwrap();
        assert!(records.has_orders_for("c1").await.unwrap());
        assert!(!records.has_orders_for("c2").await.unwrap());

        let dup = records.save_order(order("o1", "c1", "u1", date, 200.0)).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
        assert_eq!(records.orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_millisecond_ids_move_to_the_next_free_number() {
        let records = records();
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        records.save_order(order("1000", "c1", "u1", date, 1.0)).await.unwrap();
        records.save_order(order("1001", "c2", "u1", date, 1.0)).await.unwrap();

        let saved = records.save_order(order("1000", "c3", "u1", date, 1.0)).await.unwrap();
        assert_eq!(saved.id, "1002");
        assert_eq!(records.orders().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn only_the_first_order_of_a_customer_keeps_gifts() {
        let records = records();
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let with_gift = |id: &str| {
            let mut o = order(id, "c1", "u1", date, 1.0);
            o.gift_items.push(topping("Muỗng", 1, 20000.0));
            o
        };

        let (first, second) = tokio::join!(records.save_order(with_gift("1")), records.save_order(with_gift("2")));
        let kept = [first.unwrap(), second.unwrap()]
            .iter()
            .filter(|o| !o.gift_items.is_empty())
            .count();
        assert_eq!(kept, 1);

        let stored = records.orders().await.unwrap();
        assert_eq!(stored.iter().filter(|o| !o.gift_items.is_empty()).count(), 1);
    }

    #[tokio::test]
    async fn password_update_touches_only_the_target_user() {
        let store = LocalStore::in_memory();
        let users = vec![user("u1", Role::Staff, "A"), user("u2", Role::Manager, "A")];
        store.set(KEY_USERS, serde_json::to_string(&users).unwrap()).await.unwrap();
        let records = Records::new(store, SheetClient::disabled());

        assert!(records.update_user_password("u1", "moi123").await.unwrap());
        assert!(!records.update_user_password("ghost", "x").await.unwrap());

        let u1 = records.find_user("u1").await.unwrap().unwrap();
        let u2 = records.find_user("u2").await.unwrap().unwrap();
        assert_eq!(u1.password.as_deref(), Some("moi123"));
        assert_eq!(u2.password.as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn refresh_without_remote_keeps_local_data() {
        let records = records();
        records.save_customer(customer("c1", "u1", "Huế")).await.unwrap();
        assert!(!records.refresh_customers_from_cloud().await.unwrap());
        assert_eq!(records.customers().await.unwrap().len(), 1);
    }

    #[test]
    fn undecodable_rows_are_skipped() {
        let rows = vec![
            serde_json::json!({"id": 1, "role": "staff", "username": "an", "branch": "A"}),
            serde_json::json!({"id": 2, "role": "intern"}),
        ];
        let users: Vec<crate::models::user::User> = decode_rows(SyncAction::Users, rows);
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "1");
    }

    #[test]
    fn customer_rows_without_created_date_survive_refresh_decoding() {
        let rows = vec![serde_json::json!({"id": 42, "salesId": "u1", "name": "Hà", "companyName": "Kem Hà", "phone": 901})];
        let customers: Vec<crate::models::customer::Customer> = decode_rows(SyncAction::Customers, rows);
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].id, "42");
    }
}
