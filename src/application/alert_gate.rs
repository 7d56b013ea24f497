//! Daily alert gate: turns the best undervalued listing of a city into a
//! persisted `GOLDEN_OPPORTUNITY` alert, at most `daily_cap` times per city
//! per calendar day and only when the opportunity scores high enough.
//!
//! Missing or empty upstream data degrades to "no alert". Alert store
//! failures are real errors and always reach the caller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::detector::{find_undervalued_with, DetectorConfig};
use crate::application::scorer::score;
use crate::domain::entities::alert::{AlertFacts, AlertRecord};
use crate::domain::error::DomainError;
use crate::domain::ports::alert_store::AlertStore;
use crate::domain::ports::clock::Clock;
use crate::domain::ports::listing_provider::{FetchOutcome, ListingProvider};
use crate::domain::values::confidence::ConfidenceTier;
use crate::domain::values::timestamp::MinuteTimestamp;

pub const DEFAULT_DAILY_CAP: usize = 5;
pub const DEFAULT_MIN_SCORE: u8 = 80;

/// Confidence the gate attaches to every opportunity it scores.
const GATE_CONFIDENCE: ConfidenceTier = ConfidenceTier::High;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Maximum alerts stored per city per calendar day.
    pub daily_cap: usize,
    /// Minimum score an opportunity needs to be persisted.
    pub min_score: u8,
    pub detector: DetectorConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            daily_cap: DEFAULT_DAILY_CAP,
            min_score: DEFAULT_MIN_SCORE,
            detector: DetectorConfig::default(),
        }
    }
}

/// Why a gate run did or did not produce an alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    CapReached { stored_today: usize },
    NoData,
    ProviderFailed { reason: String },
    NoOpportunity,
    BelowThreshold { score: u8, discount_percent: f64 },
    Created { alert: AlertRecord },
}

impl GateOutcome {
    pub fn into_alert(self) -> Option<AlertRecord> {
        match self {
            GateOutcome::Created { alert } => Some(alert),
            _ => None,
        }
    }
}

type DayKey = (String, NaiveDate);

pub struct AlertGateUseCase {
    store: Arc<dyn AlertStore>,
    provider: Arc<dyn ListingProvider>,
    clock: Arc<dyn Clock>,
    config: GateConfig,
    day_locks: Mutex<HashMap<DayKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl AlertGateUseCase {
    pub fn new(
        store: Arc<dyn AlertStore>,
        provider: Arc<dyn ListingProvider>,
        clock: Arc<dyn Clock>,
        config: GateConfig,
    ) -> Self {
        Self {
            store,
            provider,
            clock,
            config,
            day_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run the gate for one city and return the stored alert, if any.
    pub async fn generate_city_alert(
        &self,
        city: &str,
        property_type: &str,
    ) -> Result<Option<AlertRecord>, DomainError> {
        Ok(self
            .generate_city_alert_detailed(city, property_type)
            .await?
            .into_alert())
    }

    /// Run the gate for one city and report which step decided the result.
    pub async fn generate_city_alert_detailed(
        &self,
        city: &str,
        property_type: &str,
    ) -> Result<GateOutcome, DomainError> {
        let city = city.trim();
        let now = self.clock.now();
        let today = now.date();
        let day_lock = self.day_lock(city, today);
        // Held until the alert is appended so the cap check cannot race.
        let _guard = day_lock.lock().await;

        let stored_today = self.store.query_day(city, today)?.len();
        if stored_today >= self.config.daily_cap {
            debug!(city, stored_today, cap = self.config.daily_cap, "daily alert cap reached");
            return Ok(GateOutcome::CapReached { stored_today });
        }

        let records = match self.provider.fetch(city, property_type).await {
            Ok(FetchOutcome::Records(records)) if !records.is_empty() => records,
            Ok(_) => {
                debug!(city, property_type, provider = self.provider.name(), "no listings");
                return Ok(GateOutcome::NoData);
            }
            Err(e) => {
                warn!(city, property_type, provider = self.provider.name(), error = %e, "listing fetch failed");
                return Ok(GateOutcome::ProviderFailed {
                    reason: e.to_string(),
                });
            }
        };

        let best = match find_undervalued_with(&records, city, &self.config.detector)
            .into_iter()
            .next()
        {
            Some(best) => best,
            None => {
                debug!(city, listings = records.len(), "no undervalued listings");
                return Ok(GateOutcome::NoOpportunity);
            }
        };

        let score = score(best.discount_percent, GATE_CONFIDENCE);
        if score < self.config.min_score {
            debug!(city, score, min_score = self.config.min_score, "best opportunity below threshold");
            return Ok(GateOutcome::BelowThreshold {
                score,
                discount_percent: best.discount_percent,
            });
        }

        let property_type = if property_type.trim().is_empty() {
            best.property_type.clone()
        } else {
            property_type.trim().to_string()
        };
        let alert = AlertRecord::golden_opportunity(
            city.to_string(),
            best.district.clone(),
            property_type,
            AlertFacts {
                current_price: best.current_price,
                avg_price: best.district_mean_price_per_area,
                discount_percent: best.discount_percent,
            },
            GATE_CONFIDENCE,
            score,
            MinuteTimestamp::new(now),
        );
        self.store.append(&alert)?;

        info!(
            city,
            district = %alert.district,
            score,
            discount_percent = best.discount_percent,
            "golden opportunity alert stored"
        );
        Ok(GateOutcome::Created { alert })
    }

    /// City names are matched case-insensitively everywhere, so the lock key is too.
    fn day_lock(&self, city: &str, day: NaiveDate) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .day_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.retain(|(_, d), _| *d >= day);
        locks
            .entry((city.to_ascii_lowercase(), day))
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
