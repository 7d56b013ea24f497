//! Shared test helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use realtyscout::config::ScoutConfig;
use realtyscout::domain::entities::alert::{AlertFacts, AlertRecord};
use realtyscout::domain::entities::property::PropertyRecord;
use realtyscout::domain::error::DomainError;
use realtyscout::domain::ports::alert_store::{AlertFilter, AlertStore};
use realtyscout::domain::ports::listing_provider::{FetchOutcome, ListingProvider, ProviderError};
use realtyscout::domain::values::confidence::ConfidenceTier;
use realtyscout::domain::values::timestamp::MinuteTimestamp;
use realtyscout::infrastructure::clock::FixedClock;
use realtyscout::infrastructure::listings::memory::InMemoryProvider;
use realtyscout::infrastructure::sqlite::alert_repo::SqliteAlertStore;
use realtyscout::infrastructure::sqlite::migrations::run_migrations;
use realtyscout::RealtyScout;
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const CITY: &str = "Lisbon";

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

pub fn now() -> NaiveDateTime {
    at(2024, 5, 1, 10, 15, 42)
}

/// Listing with `area` fixed at 100 m², so `price / 100` is the price per m².
pub fn listing(id: &str, city: &str, district: &str, price_per_area: f64) -> PropertyRecord {
    PropertyRecord::new(id, format!("Listing {id}"), district, city, "apartment", price_per_area * 100.0, 100.0)
}

/// One listing at 1000/m² among three at 3000/m²: a 60% discount.
pub fn bargain_market() -> Vec<PropertyRecord> {
    vec![
        listing("cheap", CITY, "Alfama", 1_000.0),
        listing("b", CITY, "Alfama", 3_000.0),
        listing("c", CITY, "Alfama", 3_000.0),
        listing("d", CITY, "Alfama", 3_000.0),
    ]
}

/// Best discount is about 16.7%, which scores 75.
pub fn mild_market() -> Vec<PropertyRecord> {
    vec![
        listing("low", CITY, "Belem", 80.0),
        listing("b", CITY, "Belem", 100.0),
        listing("c", CITY, "Belem", 100.0),
        listing("d", CITY, "Belem", 100.0),
        listing("e", CITY, "Belem", 100.0),
    ]
}

pub fn sqlite_store() -> SqliteAlertStore {
    let conn = Connection::open(":memory:").unwrap();
    run_migrations(&conn).unwrap();
    SqliteAlertStore::new(conn)
}

pub fn memory_store() -> Arc<SqliteAlertStore> {
    Arc::new(sqlite_store())
}

pub fn alert(city: &str, generated_at: NaiveDateTime, discount: f64) -> AlertRecord {
    AlertRecord::golden_opportunity(
        city.to_string(),
        "Alfama".to_string(),
        "apartment".to_string(),
        AlertFacts {
            current_price: 100_000.0,
            avg_price: 3_000.0,
            discount_percent: discount,
        },
        ConfidenceTier::High,
        95,
        MinuteTimestamp::new(generated_at),
    )
}

pub fn scout(
    store: Arc<dyn AlertStore>,
    provider: Arc<dyn ListingProvider>,
) -> RealtyScout {
    RealtyScout::with_parts(
        ScoutConfig::default(),
        store,
        provider,
        Arc::new(FixedClock(now())),
    )
    .unwrap()
}

pub fn scout_with_listings(store: Arc<dyn AlertStore>, records: Vec<PropertyRecord>) -> RealtyScout {
    scout(store, Arc::new(InMemoryProvider::new(records)))
}

/// Wraps a store and counts calls.
pub struct CountingStore<S> {
    pub inner: S,
    pub appends: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            appends: AtomicUsize::new(0),
        }
    }

    pub fn appends(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

impl<S: AlertStore> AlertStore for CountingStore<S> {
    fn append(&self, alert: &AlertRecord) -> Result<(), DomainError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.inner.append(alert)
    }

    fn query_day(&self, city: &str, day: NaiveDate) -> Result<Vec<AlertRecord>, DomainError> {
        self.inner.query_day(city, day)
    }

    fn list(&self, filter: &AlertFilter) -> Result<Vec<AlertRecord>, DomainError> {
        self.inner.list(filter)
    }
}

/// Store whose reads and/or writes always fail.
pub struct BrokenStore {
    pub fail_reads: bool,
}

impl AlertStore for BrokenStore {
    fn append(&self, _alert: &AlertRecord) -> Result<(), DomainError> {
        Err(DomainError::Store("disk full".into()))
    }

    fn query_day(&self, _city: &str, _day: NaiveDate) -> Result<Vec<AlertRecord>, DomainError> {
        if self.fail_reads {
            Err(DomainError::Store("store unavailable".into()))
        } else {
            Ok(vec![])
        }
    }

    fn list(&self, _filter: &AlertFilter) -> Result<Vec<AlertRecord>, DomainError> {
        Err(DomainError::Store("store unavailable".into()))
    }
}

/// Provider that counts fetches and returns a fixed result.
pub struct ScriptedProvider {
    pub fetches: AtomicUsize,
    pub fail: bool,
    pub records: Vec<PropertyRecord>,
}

impl ScriptedProvider {
    pub fn returning(records: Vec<PropertyRecord>) -> Self {
        Self {
            fetches: AtomicUsize::new(0),
            fail: false,
            records,
        }
    }

    pub fn failing() -> Self {
        Self {
            fetches: AtomicUsize::new(0),
            fail: true,
            records: vec![],
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, _city: &str, _property_type: &str) -> Result<FetchOutcome, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Network("connection refused".into()));
        }
        // Returns `Records` even when empty to exercise the gate's own check.
        Ok(FetchOutcome::Records(self.records.clone()))
    }
}
