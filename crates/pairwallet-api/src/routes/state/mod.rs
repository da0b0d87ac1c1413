//! User state routes - whole-document load and save

pub mod api;

pub use api::{api_get_user_state, api_save_user_state};
