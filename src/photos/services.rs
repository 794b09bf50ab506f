use std::path::{Path, PathBuf};

use tracing::warn;

use crate::clock;
use crate::entries::repo::{EntrySource, FoodEntry};
use crate::entries::services::log_entry;
use crate::labeling::UNKNOWN_FOOD;
use crate::state::AppState;

/// Photo-sourced entries carry an estimated quantity, not a measured one.
pub const PHOTO_QUANTITY: &str = "100g (estimated)";

/// Strip any path components and reduce the name to a safe character set.
pub fn sanitize_filename(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_matches('.').to_string()
}

pub fn has_allowed_extension(filename: &str, allowed: &[String]) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// On-disk name: unix-timestamp prefix avoids collisions between uploads
/// sharing an original filename.
pub fn stored_filename(original: &str) -> String {
    format!("{}_{}", clock::unix_timestamp(), sanitize_filename(original))
}

pub async fn save_upload(dir: &Path, filename: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Log one photo-sourced entry per detected label, skipping the literal
/// "unknown food". A resolver/storage failure for one label skips that
/// label only.
pub async fn auto_log_labels(state: &AppState, user_id: i64, labels: &[String]) -> Vec<FoodEntry> {
    let mut logged = Vec::new();
    for label in labels {
        let food = label.trim();
        if food.is_empty() || food.eq_ignore_ascii_case(UNKNOWN_FOOD) {
            continue;
        }
        match log_entry(state, user_id, food, PHOTO_QUANTITY, EntrySource::Photo, None).await {
            Ok(entry) => logged.push(entry),
            Err(e) => {
                warn!(error = %e, food, "failed to log detected food, skipping");
            }
        }
    }
    logged
}
