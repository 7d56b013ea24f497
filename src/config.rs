use crate::application::alert_gate::{GateConfig, DEFAULT_DAILY_CAP, DEFAULT_MIN_SCORE};
use crate::application::detector::{
    DetectorConfig, DEFAULT_DISCOUNT_THRESHOLD_PERCENT, DEFAULT_MAX_RESULTS,
};
use crate::domain::error::DomainError;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_STORE_PATH: &str = "./alerts.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// File-backed JSON list, compatible with existing alert files.
    #[default]
    Json,
    Sqlite,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Json => write!(f, "json"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(StoreBackend::Json),
            "sqlite" => Ok(StoreBackend::Sqlite),
            _ => Err(format!("Unknown store backend: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoutConfig {
    /// Max alerts per city per calendar day (REALTYSCOUT_DAILY_CAP)
    pub daily_cap: usize,
    /// Minimum score for an alert to be stored (REALTYSCOUT_MIN_SCORE)
    pub min_score: u8,
    /// Relative discount vs. district mean, in percent (REALTYSCOUT_DISCOUNT_THRESHOLD)
    pub discount_threshold_percent: f64,
    /// Opportunities returned per detection pass (REALTYSCOUT_MAX_OPPORTUNITIES)
    pub max_opportunities: usize,
    /// Alert store location (REALTYSCOUT_STORE)
    pub store_path: String,
    /// Alert store backend, `json` or `sqlite` (REALTYSCOUT_STORE_BACKEND)
    pub store_backend: StoreBackend,
    /// Live listings endpoint (REALTYSCOUT_LISTINGS_URL)
    pub listings_url: Option<String>,
    /// tracing filter directive (REALTYSCOUT_LOG)
    pub log_level: String,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            daily_cap: DEFAULT_DAILY_CAP,
            min_score: DEFAULT_MIN_SCORE,
            discount_threshold_percent: DEFAULT_DISCOUNT_THRESHOLD_PERCENT,
            max_opportunities: DEFAULT_MAX_RESULTS,
            store_path: DEFAULT_STORE_PATH.to_string(),
            store_backend: StoreBackend::default(),
            listings_url: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, DomainError> {
    match raw {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|_| DomainError::Config(format!("{key} has an invalid value: {value}"))),
        _ => Ok(default),
    }
}

impl ScoutConfig {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; missing keys use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let defaults = Self::default();
        let config = Self {
            daily_cap: parse_var(
                "REALTYSCOUT_DAILY_CAP",
                lookup("REALTYSCOUT_DAILY_CAP"),
                defaults.daily_cap,
            )?,
            min_score: parse_var(
                "REALTYSCOUT_MIN_SCORE",
                lookup("REALTYSCOUT_MIN_SCORE"),
                defaults.min_score,
            )?,
            discount_threshold_percent: parse_var(
                "REALTYSCOUT_DISCOUNT_THRESHOLD",
                lookup("REALTYSCOUT_DISCOUNT_THRESHOLD"),
                defaults.discount_threshold_percent,
            )?,
            max_opportunities: parse_var(
                "REALTYSCOUT_MAX_OPPORTUNITIES",
                lookup("REALTYSCOUT_MAX_OPPORTUNITIES"),
                defaults.max_opportunities,
            )?,
            store_path: lookup("REALTYSCOUT_STORE")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.store_path),
            store_backend: match lookup("REALTYSCOUT_STORE_BACKEND") {
                Some(raw) if !raw.trim().is_empty() => raw
                    .parse()
                    .map_err(|e: String| DomainError::Config(e))?,
                _ => defaults.store_backend,
            },
            listings_url: lookup("REALTYSCOUT_LISTINGS_URL").filter(|s| !s.trim().is_empty()),
            log_level: lookup("REALTYSCOUT_LOG")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.log_level),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.daily_cap == 0 {
            return Err(DomainError::Config("daily cap must be at least 1".into()));
        }
        if self.min_score > 100 {
            return Err(DomainError::Config(format!(
                "minimum score must be within 0..=100, got {}",
                self.min_score
            )));
        }
        if !(0.0..100.0).contains(&self.discount_threshold_percent) {
            return Err(DomainError::Config(format!(
                "discount threshold must be within [0, 100), got {}",
                self.discount_threshold_percent
            )));
        }
        Ok(())
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            discount_threshold_percent: self.discount_threshold_percent,
            max_results: self.max_opportunities,
        }
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            daily_cap: self.daily_cap,
            min_score: self.min_score,
            detector: self.detector_config(),
        }
    }
}
