use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{DayQuery, EntriesResponse, LogFoodRequest, LoggedResponse, SummaryResponse};
use crate::auth::services::AuthUser;
use crate::clock;
use crate::entries::repo::{DailySummary, FoodEntry};
use crate::entries::services::log_entry;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/log_food", post(log_food))
        .route("/get_entries", get(get_entries))
        .route("/daily_summary", get(daily_summary))
}

#[instrument(skip(state, payload))]
pub async fn log_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LogFoodRequest>,
) -> Result<Json<LoggedResponse>, (StatusCode, String)> {
    let name = match payload.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => {
            warn!("log_food missing name");
            return Err((
                StatusCode::BAD_REQUEST,
                "Missing `name` or `foodName` in request body".into(),
            ));
        }
    };

    let record = log_entry(
        &state,
        user_id,
        &name,
        &payload.quantity,
        payload.source,
        payload.supplied_macros(),
    )
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "log_food insert failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(LoggedResponse {
        saved: true,
        record,
    }))
}

#[instrument(skip(state))]
pub async fn get_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DayQuery>,
) -> Result<Json<EntriesResponse>, (StatusCode, String)> {
    let day = query.date.unwrap_or_else(clock::today_stamp);
    let entries = FoodEntry::list_for_day(&state.db, user_id, &day)
        .await
        .map_err(internal)?;
    Ok(Json(EntriesResponse { entries }))
}

#[instrument(skip(state))]
pub async fn daily_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DayQuery>,
) -> Result<Json<SummaryResponse>, (StatusCode, String)> {
    let day = query.date.unwrap_or_else(clock::today_stamp);
    let summary = DailySummary::for_day(&state.db, user_id, &day)
        .await
        .map_err(internal)?;
    Ok(Json(SummaryResponse { date: day, summary }))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "storage error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
