pub mod catalog;
pub mod customer;
pub mod lenient;
pub mod order;
pub mod user;
