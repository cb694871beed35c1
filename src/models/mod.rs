pub mod courier;
pub mod customer;
pub mod order;
pub mod user;
