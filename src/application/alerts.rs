use crate::domain::entities::alert::AlertRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::alert_store::{AlertFilter, AlertStore};
use crate::domain::ports::clock::Clock;
use serde::Serialize;
use std::sync::Arc;

pub struct AlertsUseCase {
    store: Arc<dyn AlertStore>,
    clock: Arc<dyn Clock>,
}

/// Today's alert count for one city, measured against the daily cap.
#[derive(Debug, Serialize)]
pub struct DailyAlertStatus {
    pub city: String,
    pub date: chrono::NaiveDate,
    pub stored: usize,
    pub remaining: usize,
    pub alerts: Vec<AlertRecord>,
}

impl AlertsUseCase {
    pub fn new(store: Arc<dyn AlertStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn today(&self, city: &str) -> Result<Vec<AlertRecord>, DomainError> {
        self.store.query_day(city, self.clock.today())
    }

    pub fn daily_status(&self, city: &str, daily_cap: usize) -> Result<DailyAlertStatus, DomainError> {
        let date = self.clock.today();
        let alerts = self.store.query_day(city, date)?;
        Ok(DailyAlertStatus {
            city: city.to_string(),
            date,
            stored: alerts.len(),
            remaining: daily_cap.saturating_sub(alerts.len()),
            alerts,
        })
    }

    pub fn history(&self, filter: &AlertFilter) -> Result<Vec<AlertRecord>, DomainError> {
        self.store.list(filter)
    }
}
