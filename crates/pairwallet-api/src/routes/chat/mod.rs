//! Chat routes - finance assistant

pub mod api;

pub use api::api_chat;
