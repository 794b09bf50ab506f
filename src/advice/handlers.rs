use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use crate::advice::services::advise;
use crate::auth::services::AuthUser;
use crate::clock;
use crate::entries::repo::DailySummary;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/fitness_chat", post(fitness_chat))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[instrument(skip(state, payload))]
pub async fn fitness_chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Message is required".into()));
    }

    let summary = DailySummary::for_day(&state.db, user_id, &clock::today_stamp())
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "summary for chat failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(ChatResponse {
        response: advise(message, &summary),
    }))
}
