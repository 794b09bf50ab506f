use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, instrument, warn};

use crate::auth::services::AuthUser;
use crate::clock;
use crate::entries::repo::{DailySummary, FoodEntry};
use crate::labeling::{display_labels, LabelOutcome};
use crate::photos::services::{auto_log_labels, has_allowed_extension, save_upload, stored_filename};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload_photo", post(upload_photo))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub saved: bool,
    pub filename: String,
    pub detected_label: String,
    pub meals_logged: Vec<FoodEntry>,
    pub daily_summary: DailySummary,
}

#[instrument(skip(state, multipart))]
pub async fn upload_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let mut photo: Option<(String, Bytes)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("photo") {
                    continue;
                }
                let original = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
                photo = Some((original, data));
                break;
            }
            Ok(None) => break,
            // A broken stream is its own 400, not a missing part.
            Err(e) => return Err((StatusCode::BAD_REQUEST, e.to_string())),
        }
    }

    let Some((original, data)) = photo else {
        return Err((StatusCode::BAD_REQUEST, "No photo part".into()));
    };
    if original.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No selected file".into()));
    }
    if !has_allowed_extension(&original, &state.config.allowed_extensions) {
        return Err((
            StatusCode::BAD_REQUEST,
            "File type not allowed. Use PNG, JPG, or JPEG".into(),
        ));
    }

    let filename = stored_filename(&original);
    if let Err(e) = save_upload(&state.config.upload_dir, &filename, &data).await {
        error!(error = %e, %filename, "saving upload failed");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Upload failed: {e}"),
        ));
    }

    let labels = match state.labeler.label(data, &original).await {
        LabelOutcome::Labels(labels) => labels,
        LabelOutcome::Failure(reason) => {
            warn!(%reason, %filename, "image labeling failed");
            return Err((StatusCode::BAD_REQUEST, reason));
        }
    };

    let detected_label = display_labels(&labels);
    let meals_logged = auto_log_labels(&state, user_id, &labels).await;
    let daily_summary = DailySummary::for_day(&state.db, user_id, &clock::today_stamp())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(UploadResponse {
        saved: true,
        filename,
        detected_label,
        meals_logged,
        daily_summary,
    }))
}
