//! Daily alert gate: cap, fail-soft upstream handling, score threshold and
//! persistence.

mod common;

use common::{
    alert, at, bargain_market, memory_store, mild_market, now, scout, scout_with_listings,
    sqlite_store, BrokenStore, CountingStore, ScriptedProvider, CITY,
};
use realtyscout::application::alert_gate::GateOutcome;
use realtyscout::config::ScoutConfig;
use realtyscout::domain::entities::alert::AlertType;
use realtyscout::domain::error::DomainError;
use realtyscout::domain::ports::alert_store::AlertStore;
use realtyscout::domain::ports::clock::Clock;
use realtyscout::domain::values::confidence::ConfidenceTier;
use realtyscout::infrastructure::clock::FixedClock;
use realtyscout::infrastructure::json_store::JsonFileAlertStore;
use realtyscout::infrastructure::listings::memory::InMemoryProvider;
use realtyscout::RealtyScout;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_creates_alert_for_strong_opportunity() {
    let store = memory_store();
    let rs = scout_with_listings(store.clone(), bargain_market());

    let alert = rs
        .generate_city_alert(CITY, "apartment")
        .await
        .unwrap()
        .expect("60% discount should raise an alert");

    assert_eq!(alert.alert_type, AlertType::GoldenOpportunity);
    assert_eq!(alert.city, CITY);
    assert_eq!(alert.district, "Alfama");
    assert_eq!(alert.property_type, "apartment");
    assert_eq!(alert.confidence, ConfidenceTier::High);
    assert_eq!(alert.score, 95);
    assert!((alert.facts.current_price - 100_000.0).abs() < 1e-9);
    assert!((alert.facts.avg_price - 2_500.0).abs() < 1e-9);
    assert!((alert.facts.discount_percent - 60.0).abs() < 1e-9);
    assert_eq!(alert.generated_at.to_string(), "2024-05-01 10:15");
    assert_eq!(alert.source, vec!["live_data_provider", "opportunity_finder"]);

    let stored = store.query_day(CITY, now().date()).unwrap();
    assert_eq!(stored, vec![alert]);
}

#[tokio::test]
async fn test_cap_reached_returns_none_without_fetching() {
    let store = memory_store();
    for i in 0..5 {
        store.append(&alert(CITY, at(2024, 5, 1, 8, i, 0), 40.0)).unwrap();
    }
    let provider = Arc::new(ScriptedProvider::returning(bargain_market()));
    let rs = scout(store.clone(), provider.clone());

    let outcome = rs.generate_city_alert_detailed(CITY, "apartment").await.unwrap();
    assert_eq!(outcome, GateOutcome::CapReached { stored_today: 5 });
    assert_eq!(provider.fetches(), 0);
    assert_eq!(store.query_day(CITY, now().date()).unwrap().len(), 5);
}

#[tokio::test]
async fn test_cap_is_per_city_and_per_day() {
    let store = memory_store();
    for i in 0..5 {
        // Yesterday's Lisbon alerts and today's Porto alerts.
        store.append(&alert(CITY, at(2024, 4, 30, 23, 50 + i, 0), 40.0)).unwrap();
        store.append(&alert("Porto", at(2024, 5, 1, 9, i, 0), 40.0)).unwrap();
    }
    let rs = scout_with_listings(store.clone(), bargain_market());

    let created = rs.generate_city_alert(CITY, "apartment").await.unwrap();
    assert!(created.is_some());
}

#[tokio::test]
async fn test_sixth_alert_of_the_day_is_refused() {
    let store = memory_store();
    let rs = scout_with_listings(store.clone(), bargain_market());

    for _ in 0..5 {
        assert!(rs.generate_city_alert(CITY, "apartment").await.unwrap().is_some());
    }
    assert!(rs.generate_city_alert(CITY, "apartment").await.unwrap().is_none());
    assert_eq!(rs.alerts_today(CITY).unwrap().len(), 5);

    let status = rs.daily_status(CITY).unwrap();
    assert_eq!(status.stored, 5);
    assert_eq!(status.remaining, 0);
}

#[tokio::test]
async fn test_empty_table_returns_none_and_never_persists() {
    let store = Arc::new(CountingStore::new(BrokenStore { fail_reads: false }));
    let rs = scout(store.clone(), Arc::new(ScriptedProvider::returning(vec![])));

    let outcome = rs.generate_city_alert_detailed(CITY, "apartment").await.unwrap();
    assert_eq!(outcome, GateOutcome::NoData);
    assert_eq!(store.appends(), 0);
}

#[tokio::test]
async fn test_provider_reporting_empty_returns_none() {
    let store = Arc::new(CountingStore::new(BrokenStore { fail_reads: false }));
    let rs = scout(store.clone(), Arc::new(InMemoryProvider::empty()));

    assert!(rs.generate_city_alert(CITY, "").await.unwrap().is_none());
    assert_eq!(store.appends(), 0);
}

#[tokio::test]
async fn test_provider_failure_degrades_to_no_alert() {
    let store = Arc::new(CountingStore::new(sqlite_store()));
    let rs = scout(store.clone(), Arc::new(ScriptedProvider::failing()));

    let outcome = rs.generate_city_alert_detailed(CITY, "apartment").await.unwrap();
    match outcome {
        GateOutcome::ProviderFailed { reason } => assert!(reason.contains("connection refused")),
        other => panic!("expected ProviderFailed, got {other:?}"),
    }
    assert_eq!(store.appends(), 0);
}

#[tokio::test]
async fn test_no_opportunity_returns_none() {
    let store = Arc::new(CountingStore::new(sqlite_store()));
    let flat = vec![
        common::listing("a", CITY, "Alfama", 2_000.0),
        common::listing("b", CITY, "Alfama", 2_100.0),
        common::listing("c", CITY, "Belem", 10.0),
    ];
    let rs = scout(store.clone(), Arc::new(InMemoryProvider::new(flat)));

    let outcome = rs.generate_city_alert_detailed(CITY, "apartment").await.unwrap();
    assert_eq!(outcome, GateOutcome::NoOpportunity);
    assert_eq!(store.appends(), 0);
}

#[tokio::test]
async fn test_low_score_is_not_persisted() {
    let store = Arc::new(CountingStore::new(sqlite_store()));
    let rs = scout(store.clone(), Arc::new(InMemoryProvider::new(mild_market())));

    let outcome = rs.generate_city_alert_detailed(CITY, "apartment").await.unwrap();
    match outcome {
        GateOutcome::BelowThreshold { score, discount_percent } => {
            assert_eq!(score, 75);
            assert!(discount_percent > 15.0 && discount_percent < 20.0);
        }
        other => panic!("expected BelowThreshold, got {other:?}"),
    }
    assert_eq!(store.appends(), 0);
}

#[tokio::test]
async fn test_min_score_is_configurable() {
    let store = memory_store();
    let config = ScoutConfig {
        min_score: 75,
        ..ScoutConfig::default()
    };
    let rs = RealtyScout::with_parts(
        config,
        store.clone(),
        Arc::new(InMemoryProvider::new(mild_market())),
        Arc::new(FixedClock(now())),
    )
    .unwrap();

    let alert = rs.generate_city_alert(CITY, "apartment").await.unwrap().unwrap();
    assert_eq!(alert.score, 75);
    assert_eq!(alert.district, "Belem");
}

#[tokio::test]
async fn test_store_read_failure_surfaces_as_error() {
    let provider = Arc::new(ScriptedProvider::returning(bargain_market()));
    let rs = scout(Arc::new(BrokenStore { fail_reads: true }), provider.clone());

    let result = rs.generate_city_alert(CITY, "apartment").await;
    assert!(matches!(result, Err(DomainError::Store(_))));
    assert_eq!(provider.fetches(), 0);
}

#[tokio::test]
async fn test_store_write_failure_is_not_reported_as_no_alert() {
    let rs = scout(
        Arc::new(BrokenStore { fail_reads: false }),
        Arc::new(InMemoryProvider::new(bargain_market())),
    );

    let result = rs.generate_city_alert(CITY, "apartment").await;
    match result {
        Err(DomainError::Store(msg)) => assert!(msg.contains("disk full")),
        other => panic!("expected store error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_type_uses_opportunity_type() {
    let store = memory_store();
    let rs = scout_with_listings(store, bargain_market());
    let alert = rs.generate_city_alert(CITY, "").await.unwrap().unwrap();
    assert_eq!(alert.property_type, "apartment");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_respect_the_cap() {
    let store = memory_store();
    let rs = Arc::new(scout_with_listings(store.clone(), bargain_market()));

    let mut handles = Vec::new();
    for _ in 0..12 {
        let rs = rs.clone();
        handles.push(tokio::spawn(async move {
            rs.generate_city_alert(CITY, "apartment").await.unwrap()
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            created += 1;
        }
    }
    assert_eq!(created, 5);
    assert_eq!(store.query_day(CITY, now().date()).unwrap().len(), 5);
}

#[tokio::test]
async fn test_cap_ignores_city_case_and_padding() {
    let store = memory_store();
    for i in 0..5 {
        store.append(&alert(CITY, at(2024, 5, 1, 8, i, 0), 40.0)).unwrap();
    }
    let provider = Arc::new(ScriptedProvider::returning(bargain_market()));
    let rs = scout(store.clone(), provider.clone());

    for city in ["lisbon", " Lisbon ", "LISBON"] {
        let outcome = rs.generate_city_alert_detailed(city, "apartment").await.unwrap();
        assert_eq!(outcome, GateOutcome::CapReached { stored_today: 5 });
    }
    assert_eq!(provider.fetches(), 0);
    assert_eq!(store.query_day(CITY, now().date()).unwrap().len(), 5);
}

#[tokio::test]
async fn test_mixed_case_callers_share_one_budget() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonFileAlertStore::new(dir.path().join("alerts.json")));
    let rs = scout_with_listings(store.clone(), bargain_market());

    let mut created = 0;
    for city in ["Lisbon", "lisbon", " Lisbon", "LISBON ", "Lisbon", "lisbon", "Lisbon"] {
        if let Some(alert) = rs.generate_city_alert(city, "apartment").await.unwrap() {
            assert_eq!(alert.city, city.trim());
            created += 1;
        }
    }
    assert_eq!(created, 5);
    assert_eq!(store.query_day("LISBON", now().date()).unwrap().len(), 5);
}

/// Returns `first` on the first reading and `later` afterwards.
struct SteppingClock {
    first: chrono::NaiveDateTime,
    later: chrono::NaiveDateTime,
    reads: AtomicUsize,
}

impl Clock for SteppingClock {
    fn now(&self) -> chrono::NaiveDateTime {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
            self.first
        } else {
            self.later
        }
    }
}

#[tokio::test]
async fn test_alert_is_stamped_on_the_day_it_was_counted_against() {
    let store = memory_store();
    let clock = Arc::new(SteppingClock {
        first: at(2024, 5, 1, 23, 59, 58),
        later: at(2024, 5, 2, 0, 0, 3),
        reads: AtomicUsize::new(0),
    });
    let rs = RealtyScout::with_parts(
        ScoutConfig::default(),
        store.clone(),
        Arc::new(InMemoryProvider::new(bargain_market())),
        clock,
    )
    .unwrap();

    let alert = rs.generate_city_alert(CITY, "apartment").await.unwrap().unwrap();
    assert_eq!(alert.generated_at.to_string(), "2024-05-01 23:59");
    assert_eq!(store.query_day(CITY, at(2024, 5, 1, 0, 0, 0).date()).unwrap().len(), 1);
    assert!(store.query_day(CITY, at(2024, 5, 2, 0, 0, 0).date()).unwrap().is_empty());
}
