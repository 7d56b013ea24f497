pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::alert_gate::{AlertGateUseCase, GateOutcome};
use crate::application::alerts::{AlertsUseCase, DailyAlertStatus};
use crate::application::market_stats::{MarketStatsUseCase, MarketSummary};
use crate::config::{ScoutConfig, StoreBackend};
use crate::domain::entities::alert::AlertRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::alert_store::{AlertFilter, AlertStore};
use crate::domain::ports::clock::Clock;
use crate::domain::ports::listing_provider::ListingProvider;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::json_store::JsonFileAlertStore;
use crate::infrastructure::listings::http::HttpListingProvider;
use crate::infrastructure::listings::memory::InMemoryProvider;
use crate::infrastructure::sqlite::alert_repo::SqliteAlertStore;
use crate::infrastructure::sqlite::migrations::run_migrations;
use rusqlite::Connection;
use std::sync::Arc;

pub struct RealtyScout {
    config: ScoutConfig,
    gate_uc: AlertGateUseCase,
    alerts_uc: AlertsUseCase,
    stats_uc: MarketStatsUseCase,
}

/// Open the alert store selected by `config`.
pub fn open_store(config: &ScoutConfig) -> Result<Arc<dyn AlertStore>, DomainError> {
    match config.store_backend {
        StoreBackend::Json => Ok(Arc::new(JsonFileAlertStore::new(&config.store_path))),
        StoreBackend::Sqlite => {
            let conn = Connection::open(&config.store_path)
                .map_err(|e| DomainError::Store(format!("DB error: {e}")))?;
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| DomainError::Store(format!("WAL error: {e}")))?;
            run_migrations(&conn)?;
            Ok(Arc::new(SqliteAlertStore::new(conn)))
        }
    }
}

impl RealtyScout {
    /// Wire the live listing endpoint from `config.listings_url`, or an
    /// empty provider when none is configured.
    pub fn new(config: ScoutConfig) -> Result<Self, DomainError> {
        let provider: Arc<dyn ListingProvider> = match &config.listings_url {
            Some(url) => Arc::new(HttpListingProvider::new(url.clone())),
            None => {
                tracing::warn!("no listings URL configured; live alerts will find no data");
                Arc::new(InMemoryProvider::empty())
            }
        };
        Self::with_provider(config, provider)
    }

    pub fn with_provider(
        config: ScoutConfig,
        provider: Arc<dyn ListingProvider>,
    ) -> Result<Self, DomainError> {
        let store = open_store(&config)?;
        Self::with_parts(config, store, provider, Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: ScoutConfig,
        store: Arc<dyn AlertStore>,
        provider: Arc<dyn ListingProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self {
            gate_uc: AlertGateUseCase::new(
                store.clone(),
                provider.clone(),
                clock.clone(),
                config.gate_config(),
            ),
            alerts_uc: AlertsUseCase::new(store, clock),
            stats_uc: MarketStatsUseCase::new(provider),
            config,
        })
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    // Delegating methods
    pub async fn generate_city_alert(
        &self,
        city: &str,
        property_type: &str,
    ) -> Result<Option<AlertRecord>, DomainError> {
        self.gate_uc.generate_city_alert(city, property_type).await
    }

    pub async fn generate_city_alert_detailed(
        &self,
        city: &str,
        property_type: &str,
    ) -> Result<GateOutcome, DomainError> {
        self.gate_uc.generate_city_alert_detailed(city, property_type).await
    }

    pub fn alerts_today(&self, city: &str) -> Result<Vec<AlertRecord>, DomainError> {
        self.alerts_uc.today(city)
    }

    pub fn daily_status(&self, city: &str) -> Result<DailyAlertStatus, DomainError> {
        self.alerts_uc.daily_status(city, self.config.daily_cap)
    }

    pub fn alert_history(&self, filter: &AlertFilter) -> Result<Vec<AlertRecord>, DomainError> {
        self.alerts_uc.history(filter)
    }

    pub async fn market_summary(
        &self,
        city: &str,
        property_type: &str,
        outlier_factor: Option<f64>,
    ) -> Result<MarketSummary, DomainError> {
        self.stats_uc.summarize_city(city, property_type, outlier_factor).await
    }
}
