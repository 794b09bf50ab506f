use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// How an entry was captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EntrySource {
    #[default]
    Typed,
    Photo,
    Voice,
}

/// One logged food item, owned by exactly one user. Append-only: nothing in
/// the system updates or deletes a stored entry.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FoodEntry {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub name: String,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub quantity: String,
    pub source: EntrySource,
    pub created_at: String,
}

#[derive(Debug)]
pub struct NewEntry {
    pub name: String,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub quantity: String,
    pub source: EntrySource,
    pub created_at: String,
}

/// Per-day macro totals. Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailySummary {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl FoodEntry {
    /// Unconditional insert: no dedup, no uniqueness. Two identical
    /// simultaneous logs legitimately produce two rows.
    pub async fn insert(
        db: &SqlitePool,
        user_id: i64,
        new: &NewEntry,
    ) -> anyhow::Result<FoodEntry> {
        let entry = sqlx::query_as::<_, FoodEntry>(
            r#"
            INSERT INTO entries (user_id, name, calories, protein, carbs, fat, quantity, source, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, name, calories, protein, carbs, fat, quantity, source, created_at
            "#,
        )
        .bind(user_id)
        .bind(&new.name)
        .bind(new.calories)
        .bind(new.protein)
        .bind(new.carbs)
        .bind(new.fat)
        .bind(&new.quantity)
        .bind(new.source)
        .bind(&new.created_at)
        .fetch_one(db)
        .await?;
        Ok(entry)
    }

    /// Entries whose stored timestamp begins with `day` (`YYYY-MM-DD`),
    /// newest first.
    pub async fn list_for_day(
        db: &SqlitePool,
        user_id: i64,
        day: &str,
    ) -> anyhow::Result<Vec<FoodEntry>> {
        let rows = sqlx::query_as::<_, FoodEntry>(
            r#"
            SELECT id, user_id, name, calories, protein, carbs, fat, quantity, source, created_at
            FROM entries
            WHERE user_id = ? AND created_at LIKE ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(format!("{day}%"))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

impl DailySummary {
    pub const ZERO: DailySummary = DailySummary {
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
    };

    /// Field-wise sum over one user's entries for one day; null macros count
    /// as zero, and no matching entries yields the all-zero summary.
    pub async fn for_day(
        db: &SqlitePool,
        user_id: i64,
        day: &str,
    ) -> anyhow::Result<DailySummary> {
        let row: (Option<f64>, Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            r#"
            SELECT SUM(COALESCE(calories, 0.0)), SUM(COALESCE(protein, 0.0)),
                   SUM(COALESCE(carbs, 0.0)), SUM(COALESCE(fat, 0.0))
            FROM entries
            WHERE user_id = ? AND created_at LIKE ?
            "#,
        )
        .bind(user_id)
        .bind(format!("{day}%"))
        .fetch_one(db)
        .await?;

        Ok(DailySummary {
            calories: row.0.unwrap_or(0.0),
            protein: row.1.unwrap_or(0.0),
            carbs: row.2.unwrap_or(0.0),
            fat: row.3.unwrap_or(0.0),
        })
    }
}
