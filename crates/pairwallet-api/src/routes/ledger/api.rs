//! Ledger API endpoints - JSON API over a stored document

use axum::extract::{Path, Query, State};
use axum::Json;
use pairwallet_core::planner::{items_on, planned_items};
use pairwallet_core::time::parse_iso_date;
use pairwallet_core::{ledger, LedgerSummary, PlannedItem};
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::{parse_day, require_document};
use crate::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Dashboard figures; `?date=` picks the month, default today
pub async fn api_summary(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<LedgerSummary>, ApiError> {
    let today = parse_day(query.date.as_deref())?;
    let document = require_document(&state, &user_id).await?;
    Ok(Json(ledger::summary(&document, today)))
}

/// Planner calendar; `?date=` keeps only that day's items
pub async fn api_planner(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<PlannedItem>>, ApiError> {
    let day = match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => Some(parse_iso_date(raw).ok_or_else(|| ApiError::BadRequest {
            message: format!("invalid date {:?}, expected YYYY-MM-DD", raw),
        })?),
        None => None,
    };
    let document = require_document(&state, &user_id).await?;
    let items = planned_items(&document);
    Ok(Json(match day {
        Some(day) => items_on(&items, day),
        None => items,
    }))
}
