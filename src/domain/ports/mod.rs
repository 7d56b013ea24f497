pub mod alert_store;
pub mod clock;
pub mod listing_provider;
