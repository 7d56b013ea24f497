pub mod alert_gate;
pub mod alerts;
pub mod detector;
pub mod market_stats;
pub mod scorer;
