//! PostgreSQL claim store
//!
//! Requires a reachable server; unit tests here never open a connection.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLClaimStore;
pub use client::PostgreSQLClient;
