//! Inventory service: JWT-gated product CRUD, search and analytics over
//! PostgreSQL, plus a typed client carrying the admin/dashboard view logic.

pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod products;
pub mod state;

#[cfg(test)]
mod test_support;
