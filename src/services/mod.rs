pub mod analysis;
pub mod customer_stats;
pub mod order_calculator;
pub mod quote;
pub mod reports;
pub mod visibility;
