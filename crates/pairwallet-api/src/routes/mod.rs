//! Route modules for the API server
//!
//! - state: whole-document load and save per user
//! - ledger: derived summary and planner views of a stored document
//! - chat: finance assistant proxy
//!
//! Each module keeps its handlers in api.rs.

pub mod chat;
pub mod ledger;
pub mod state;

use chrono::NaiveDate;
use pairwallet_core::migrate::migrate_legacy;
use pairwallet_core::time::parse_iso_date;
use pairwallet_core::AppState;

use crate::error::ApiError;
use crate::storage::is_valid_user_id;
use crate::ServerState;

pub(crate) fn check_user_id(user_id: &str) -> Result<(), ApiError> {
    if is_valid_user_id(user_id) {
        Ok(())
    } else {
        Err(ApiError::BadRequest {
            message: format!("invalid user id {:?}", user_id),
        })
    }
}

/// Stored document for `user_id`, upgraded to the current schema
pub(crate) async fn load_document(
    state: &ServerState,
    user_id: &str,
) -> Result<Option<AppState>, ApiError> {
    check_user_id(user_id)?;
    let mut document = match state.store.load(user_id).await? {
        Some(document) => document,
        None => return Ok(None),
    };
    migrate_legacy(&mut document);
    Ok(Some(document))
}

/// Like [`load_document`], but a missing document is a 404
pub(crate) async fn require_document(
    state: &ServerState,
    user_id: &str,
) -> Result<AppState, ApiError> {
    load_document(state, user_id).await?.ok_or_else(|| ApiError::NotFound {
        resource: format!("state for user {}", user_id),
    })
}

/// `?date=YYYY-MM-DD`, defaulting to today (UTC)
pub(crate) fn parse_day(value: Option<&str>) -> Result<NaiveDate, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(chrono::Utc::now().date_naive()),
        Some(raw) => parse_iso_date(raw).ok_or_else(|| ApiError::BadRequest {
            message: format!("invalid date {:?}, expected YYYY-MM-DD", raw),
        }),
    }
}
