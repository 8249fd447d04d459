pub mod customer;
pub mod order;
pub mod report;
pub mod user;
