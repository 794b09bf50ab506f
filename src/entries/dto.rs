use serde::{Deserialize, Serialize};

use crate::entries::repo::{DailySummary, EntrySource, FoodEntry};
use crate::nutrition::Macros;

/// Body of `POST /api/log_food`. `foodName` is accepted as an alias for
/// `name`.
#[derive(Debug, Deserialize)]
pub struct LogFoodRequest {
    #[serde(alias = "foodName")]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub source: EntrySource,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

impl LogFoodRequest {
    /// Supplied macros bypass the resolver only when all four are present;
    /// they are then stored exactly as given.
    pub fn supplied_macros(&self) -> Option<Macros> {
        Some(Macros {
            calories: self.calories?,
            protein: self.protein?,
            carbs: self.carbs?,
            fat: self.fat?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoggedResponse {
    pub saved: bool,
    pub record: FoodEntry,
}

#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    pub entries: Vec<FoodEntry>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub date: String,
    pub summary: DailySummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_food_name_alias_and_defaults() {
        let req: LogFoodRequest = serde_json::from_str(r#"{"foodName": "banana"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("banana"));
        assert_eq!(req.quantity, "");
        assert_eq!(req.source, EntrySource::Typed);
        assert!(req.supplied_macros().is_none());
    }

    #[test]
    fn bypass_requires_all_four_macros() {
        let partial: LogFoodRequest = serde_json::from_str(
            r#"{"name": "oats", "calories": 380.0, "protein": 13.0, "carbs": 67.0}"#,
        )
        .unwrap();
        assert!(partial.supplied_macros().is_none());

        let full: LogFoodRequest = serde_json::from_str(
            r#"{"name": "oats", "calories": 380.0, "protein": 13.0, "carbs": 67.0, "fat": 6.5}"#,
        )
        .unwrap();
        let macros = full.supplied_macros().unwrap();
        assert_eq!(macros.calories, 380.0);
        assert_eq!(macros.fat, 6.5);
    }

    #[test]
    fn source_parses_from_body() {
        let req: LogFoodRequest =
            serde_json::from_str(r#"{"name": "coffee", "source": "voice"}"#).unwrap();
        assert_eq!(req.source, EntrySource::Voice);
    }
}
