use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{round1, Macros, NutritionLookup};
use crate::config::UsdaConfig;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Energy values above this are assumed to be kJ and converted to kcal.
/// Best-effort heuristic on the raw value, not a unit field check.
const KJ_THRESHOLD: f64 = 50.0;
const KJ_PER_KCAL: f64 = 4.184;

/// USDA FoodData Central search client. One query per resolve, single best
/// match, no retries.
pub struct UsdaClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<FoodHit>,
}

#[derive(Debug, Deserialize)]
struct FoodHit {
    #[serde(default, rename = "foodNutrients")]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrient {
    #[serde(rename = "nutrientName")]
    nutrient_name: String,
    #[serde(default)]
    value: f64,
}

impl UsdaClient {
    pub fn new(config: &UsdaConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(SEARCH_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }
}

fn macros_from_hit(hit: &FoodHit) -> Macros {
    let nutrient = |name: &str| {
        hit.food_nutrients
            .iter()
            .find(|n| n.nutrient_name == name)
            .map(|n| n.value)
            .unwrap_or(0.0)
    };

    let mut calories = nutrient("Energy");
    if calories > KJ_THRESHOLD {
        calories /= KJ_PER_KCAL;
    }

    Macros {
        calories: round1(calories),
        protein: round1(nutrient("Protein")),
        carbs: round1(nutrient("Carbohydrate, by difference")),
        fat: round1(nutrient("Total lipid (fat)")),
    }
}

#[async_trait]
impl NutritionLookup for UsdaClient {
    async fn search(&self, food: &str) -> anyhow::Result<Macros> {
        let response = self
            .client
            .get(format!("{}/foods/search", self.base_url))
            .query(&[
                ("query", food),
                ("pageSize", "1"),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let body: SearchResponse = response.json().await?;
        let hit = body
            .foods
            .first()
            .ok_or_else(|| anyhow::anyhow!("no match for {food:?}"))?;
        Ok(macros_from_hit(hit))
    }
}
