//! Chat API endpoint - forwards the conversation to the completion endpoint

use axum::extract::State;
use axum::Json;
use pairwallet_core::chat::{system_instruction, ChatMessage};
use pairwallet_core::AppState;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::load_document;
use crate::ServerState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    /// Client-side state; takes precedence over the stored document
    #[serde(default)]
    pub state: Option<AppState>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

pub async fn api_chat(
    State(state): State<ServerState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let client = state.chat.as_ref().ok_or_else(|| ApiError::Unavailable {
        message: "chat assistant is not configured".to_string(),
    })?;
    if request.messages.is_empty() {
        return Err(ApiError::BadRequest {
            message: "messages must not be empty".to_string(),
        });
    }

    let document = match (request.state, request.user_id.as_deref()) {
        (Some(document), _) => document,
        (None, Some(user_id)) => load_document(&state, user_id).await?.unwrap_or_default(),
        (None, None) => {
            return Err(ApiError::BadRequest {
                message: "either state or userId is required".to_string(),
            })
        }
    };

    let system = system_instruction(&document, chrono::Utc::now().date_naive());
    let reply = client.complete(&system, &request.messages).await?;
    Ok(Json(ChatReply { reply }))
}
