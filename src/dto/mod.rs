pub mod auth;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod orders;
pub mod receipt;
