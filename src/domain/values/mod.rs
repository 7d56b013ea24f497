pub mod confidence;
pub mod risk_tier;
pub mod timestamp;
