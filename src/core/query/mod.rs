//! Query parameters and execution over the analytical views

pub mod engine;
pub mod filter;

pub use engine::{execute, QueryEngine};
pub use filter::{QueryFilter, QueryParams, SortOrder};
