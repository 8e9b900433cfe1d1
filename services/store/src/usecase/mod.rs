pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;
pub mod profile;
