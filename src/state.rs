use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::labeling::{ImaggaClient, Labeler};
use crate::nutrition::{FallbackPolicy, NutritionResolver, UsdaClient};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub resolver: NutritionResolver,
    pub labeler: Labeler,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let options =
            SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        let fallback = if config.deterministic_fallback {
            FallbackPolicy::Fixed
        } else {
            FallbackPolicy::Random
        };
        let resolver = NutritionResolver::new(Arc::new(UsdaClient::new(&config.usda)?), fallback);
        let labeler = Labeler::new(Arc::new(ImaggaClient::new(&config.imagga)?));

        Ok(Self {
            db,
            config,
            resolver,
            labeler,
        })
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        resolver: NutritionResolver,
        labeler: Labeler,
    ) -> Self {
        Self {
            db,
            config,
            resolver,
            labeler,
        }
    }

    /// Test state: lazy in-memory pool, deterministic fallback, and fake
    /// external services.
    pub fn fake() -> Self {
        use async_trait::async_trait;
        use bytes::Bytes;

        use crate::config::{ImaggaConfig, JwtConfig, UsdaConfig};
        use crate::labeling::{FoodTag, ImageTagger, TagError};
        use crate::nutrition::{Macros, NutritionLookup};

        struct FakeLookup;

        #[async_trait]
        impl NutritionLookup for FakeLookup {
            async fn search(&self, _food: &str) -> anyhow::Result<Macros> {
                Ok(Macros {
                    calories: 89.0,
                    protein: 1.1,
                    carbs: 22.8,
                    fat: 0.3,
                })
            }
        }

        struct FakeTagger;

        #[async_trait]
        impl ImageTagger for FakeTagger {
            async fn tag(&self, _image: Bytes, _filename: &str) -> Result<Vec<FoodTag>, TagError> {
                Ok(vec![FoodTag {
                    name: "banana".into(),
                    confidence: 61.4,
                }])
            }
        }

        let db = SqlitePoolOptions::new()
            .connect_lazy("sqlite::memory:")
            .expect("lazy pool ok");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            upload_dir: std::env::temp_dir().join("nutrilog-test-uploads"),
            allowed_extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            deterministic_fallback: true,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-audience".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            usda: UsdaConfig {
                api_key: "test".into(),
                base_url: "http://usda.invalid".into(),
            },
            imagga: ImaggaConfig {
                api_key: "test".into(),
                api_secret: "test".into(),
                base_url: "http://imagga.invalid".into(),
            },
        });

        let resolver = NutritionResolver::new(Arc::new(FakeLookup), FallbackPolicy::Fixed);
        let labeler = Labeler::new(Arc::new(FakeTagger));

        Self {
            db,
            config,
            resolver,
            labeler,
        }
    }
}
