use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// USDA FoodData Central search credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct UsdaConfig {
    pub api_key: String,
    pub base_url: String,
}

/// Imagga tagging credentials (key/secret pair, HTTP basic auth).
#[derive(Debug, Clone, Deserialize)]
pub struct ImaggaConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub allowed_extensions: Vec<String>,
    /// When true, failed nutrition lookups return a fixed all-zero
    /// placeholder instead of randomized macros.
    pub deterministic_fallback: bool,
    pub jwt: JwtConfig,
    pub usda: UsdaConfig,
    pub imagga: ImaggaConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data.db".into());
        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));
        let allowed_extensions = std::env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "png,jpg,jpeg".into())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        let deterministic_fallback = std::env::var("NUTRITION_FALLBACK")
            .map(|v| v == "fixed")
            .unwrap_or(false);

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutrilog".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutrilog-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };

        let usda = UsdaConfig {
            api_key: std::env::var("USDA_API_KEY").unwrap_or_default(),
            base_url: std::env::var("USDA_BASE_URL")
                .unwrap_or_else(|_| "https://api.nal.usda.gov/fdc/v1".into()),
        };

        let imagga = ImaggaConfig {
            api_key: std::env::var("IMAGGA_API_KEY").unwrap_or_default(),
            api_secret: std::env::var("IMAGGA_API_SECRET").unwrap_or_default(),
            base_url: std::env::var("IMAGGA_BASE_URL")
                .unwrap_or_else(|_| "https://api.imagga.com/v2".into()),
        };

        Ok(Self {
            database_url,
            upload_dir,
            allowed_extensions,
            deterministic_fallback,
            jwt,
            usda,
            imagga,
        })
    }
}
