//! Ledger routes - summary and planner views

pub mod api;

pub use api::{api_planner, api_summary};
