use crate::domain::values::confidence::ConfidenceTier;
use crate::domain::values::timestamp::MinuteTimestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Producers credited on every alert raised by the daily gate.
pub const ALERT_SOURCES: [&str; 2] = ["live_data_provider", "opportunity_finder"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    GoldenOpportunity,
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertType::GoldenOpportunity => write!(f, "GOLDEN_OPPORTUNITY"),
        }
    }
}

/// The numbers an alert was raised on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertFacts {
    pub current_price: f64,
    /// District mean price per m² the discount was measured against.
    pub avg_price: f64,
    pub discount_percent: f64,
}

/// A persisted alert. Field names and the `generated_at` format are the
/// on-disk contract shared with previously stored alert lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub city: String,
    pub district: String,
    pub property_type: String,
    pub facts: AlertFacts,
    pub confidence: ConfidenceTier,
    pub score: u8,
    pub generated_at: MinuteTimestamp,
    pub source: Vec<String>,
}

impl AlertRecord {
    pub fn golden_opportunity(
        city: String,
        district: String,
        property_type: String,
        facts: AlertFacts,
        confidence: ConfidenceTier,
        score: u8,
        generated_at: MinuteTimestamp,
    ) -> Self {
        Self {
            alert_type: AlertType::GoldenOpportunity,
            city,
            district,
            property_type,
            facts,
            confidence,
            score: score.min(100),
            generated_at,
            source: ALERT_SOURCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
