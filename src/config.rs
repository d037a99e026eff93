use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::{Ranker, SystemClock};
use crate::models::{BoostSettings, MustHavePolicy, ScoringWeights};

const ENV_PREFIX: &str = "KINDRED";

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
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

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Shared tier; absent means in-process caching only
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    /// Row cap on every candidate pool fetch
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Proximity radius when the requester has no maximum distance
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            pool_size: default_pool_size(),
            default_radius_km: default_radius_km(),
        }
    }
}

fn default_limit() -> usize { 20 }
fn default_max_limit() -> usize { 50 }
fn default_pool_size() -> usize { 1000 }
fn default_radius_km() -> f64 { 100.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: ScoringWeights,
    #[serde(default)]
    pub boosts: BoostSettings,
    /// Upper bound of the per-day freshness boost on daily matches
    #[serde(default = "default_daily_jitter")]
    pub daily_jitter: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            boosts: BoostSettings::default(),
            daily_jitter: default_daily_jitter(),
        }
    }
}

fn default_daily_jitter() -> f64 { 2.0 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingSettings {
    #[serde(default)]
    pub must_have_policy: MustHavePolicy,
}

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

impl LoggingSettings {
    /// Apply `LOG_LEVEL` / `LOG_FORMAT` style overrides over the configured values
    pub fn overridden(&self, level: Option<String>, format: Option<String>) -> Self {
        Self {
            level: level.filter(|l| !l.trim().is_empty()).unwrap_or_else(|| self.level.clone()),
            format: format.filter(|f| !f.trim().is_empty()).unwrap_or_else(|| self.format.clone()),
        }
    }

    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with KINDRED__)
    /// 4. DATABASE_URL and REDIS_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., KINDRED__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        let settings: Self = apply_url_overrides(settings)?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the ranker cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring
            .weights
            .check()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        if !matches!(self.logging.format.to_ascii_lowercase().as_str(), "json" | "pretty") {
            return Err(ConfigError::Message(format!(
                "logging.format must be json or pretty, got {}",
                self.logging.format
            )));
        }
        if self.discovery.default_limit == 0 || self.discovery.default_limit > self.discovery.max_limit {
            return Err(ConfigError::Message(format!(
                "discovery.default_limit must be in 1..={}",
                self.discovery.max_limit
            )));
        }
        if self.discovery.pool_size == 0 {
            return Err(ConfigError::Message("discovery.pool_size must be positive".to_string()));
        }
        if !(self.discovery.default_radius_km > 0.0) {
            return Err(ConfigError::Message(
                "discovery.default_radius_km must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Ranker configured from the scoring and ranking sections
    pub fn ranker(&self) -> Ranker<SystemClock> {
        Ranker::new(self.scoring.weights)
            .with_boosts(self.scoring.boosts)
            .with_must_have_policy(self.ranking.must_have_policy)
            .with_default_radius_km(self.discovery.default_radius_km)
            .with_daily_jitter(self.scoring.daily_jitter)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional DATABASE_URL and REDIS_URL variables over the loaded config
fn apply_url_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }

    builder.build()
}
