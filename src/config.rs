use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::embedding::DEFAULT_HASHING_DIMENSION;
use crate::core::scoring::validate_weights;
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_distance_km: default_max_distance_km(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            min_score: default_min_score(),
        }
    }
}

fn default_max_distance_km() -> f64 { 50.0 }
fn default_limit() -> u16 { 10 }
fn default_max_limit() -> u16 { 100 }
fn default_min_score() -> f64 { 0.3 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_similarity_weight")]
    pub similarity: f64,
    #[serde(default = "default_distance_weight")]
    pub distance: f64,
    #[serde(default = "default_experience_weight")]
    pub experience: f64,
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
    #[serde(default = "default_rate_weight")]
    pub rate: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            similarity: default_similarity_weight(),
            distance: default_distance_weight(),
            experience: default_experience_weight(),
            rating: default_rating_weight(),
            rate: default_rate_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            similarity: config.similarity,
            distance: config.distance,
            experience: config.experience,
            rating: config.rating,
            rate: config.rate,
        }
    }
}

fn default_similarity_weight() -> f64 { 0.5 }
fn default_distance_weight() -> f64 { 0.2 }
fn default_experience_weight() -> f64 { 0.1 }
fn default_rating_weight() -> f64 { 0.1 }
fn default_rate_weight() -> f64 { 0.1 }

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    /// "hashing" or "minilm" (needs the `semantic-model` feature)
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Vector width for the hashing backend
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// HuggingFace model id for the minilm backend
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Load the model at startup instead of on the first request
    #[serde(default)]
    pub warmup: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            dimension: default_dimension(),
            model_id: default_model_id(),
            warmup: false,
        }
    }
}

fn default_backend() -> String { "hashing".to_string() }
fn default_dimension() -> usize { DEFAULT_HASHING_DIMENSION }
fn default_model_id() -> String { "sentence-transformers/all-MiniLM-L6-v2".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with PROMATCH__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., PROMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("PROMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("PROMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the matching engine would refuse later
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_weights(&self.scoring.weights())
            .map_err(|e| ConfigError::Message(format!("scoring.weights: {}", e)))?;

        if !(0.0..=1.0).contains(&self.matching.min_score) {
            return Err(ConfigError::Message(format!(
                "matching.min_score must be within [0, 1], got {}",
                self.matching.min_score
            )));
        }
        if self.embedding.dimension == 0 {
            return Err(ConfigError::Message(
                "embedding.dimension must be at least 1".to_string(),
            ));
        }
        if self.matching.default_limit > self.matching.max_limit {
            return Err(ConfigError::Message(format!(
                "matching.default_limit ({}) exceeds matching.max_limit ({})",
                self.matching.default_limit, self.matching.max_limit
            )));
        }

        Ok(())
    }
}

impl ScoringSettings {
    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.weights)
    }
}

/// `DATABASE_URL` wins over the configured database url, as most
/// deployment platforms set that variable directly.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.similarity, 0.5);
        assert_eq!(weights.distance, 0.2);
        assert_eq!(weights.experience, 0.1);
        assert_eq!(weights.rating, 0.1);
        assert_eq!(weights.rate, 0.1);
        assert_eq!(ScoringWeights::from(&weights), ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_shipped_config_parses() {
        let settings: Settings = toml::from_str(include_str!("../config/default.toml"))
            .expect("config/default.toml should deserialize");
        assert!(settings.validate().is_ok());
        assert_eq!(settings.matching.max_distance_km, 50.0);
        assert_eq!(settings.embedding.backend, "hashing");
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut settings: Settings = toml::from_str(include_str!("../config/default.toml")).unwrap();
        settings.scoring.weights.similarity = 0.7;
        settings.scoring.weights.distance = 0.3;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_min_score_range() {
        let mut settings: Settings = toml::from_str(include_str!("../config/default.toml")).unwrap();
        settings.matching.min_score = 1.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_embedding_dimension_rejected() {
        let mut settings: Settings = toml::from_str(include_str!("../config/default.toml")).unwrap();
        settings.embedding.dimension = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("embedding.dimension"));
    }
}
