//! Campus canteen ordering API: menu, stateless cart, simulated payment,
//! order persistence and receipts.

pub mod audit;
pub mod cart;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod handoff;
pub mod middleware;
pub mod models;
pub mod payment;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::create_api_router;
