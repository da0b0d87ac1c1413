//! User state API endpoints - JSON API

use axum::extract::{Path, State};
use axum::Json;
use pairwallet_core::remote::{SaveAck, StateEnvelope};
use pairwallet_core::AppState;

use crate::error::ApiError;
use crate::routes::{check_user_id, load_document};
use crate::ServerState;

/// `{"state": null}` when the user has no document yet
pub async fn api_get_user_state(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<StateEnvelope>, ApiError> {
    let document = load_document(&state, &user_id).await?;
    Ok(Json(StateEnvelope { state: document }))
}

/// Replace the user's document; last write wins
pub async fn api_save_user_state(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(document): Json<AppState>,
) -> Result<Json<SaveAck>, ApiError> {
    check_user_id(&user_id)?;
    state.store.save(&user_id, &document).await?;
    log::info!(
        "Saved state for user {} ({} transactions, {} accounts)",
        user_id,
        document.transactions.len(),
        document.accounts.len()
    );
    Ok(Json(SaveAck { success: true }))
}
