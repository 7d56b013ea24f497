use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse reliability estimate attached to an opportunity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Bonus points this tier contributes to an opportunity score.
    pub fn score_bonus(&self) -> i32 {
        match self {
            ConfidenceTier::High => 15,
            ConfidenceTier::Medium | ConfidenceTier::Low => 0,
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceTier::Low => write!(f, "LOW"),
            ConfidenceTier::Medium => write!(f, "MEDIUM"),
            ConfidenceTier::High => write!(f, "HIGH"),
        }
    }
}

impl FromStr for ConfidenceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ConfidenceTier::Low),
            "medium" => Ok(ConfidenceTier::Medium),
            "high" => Ok(ConfidenceTier::High),
            _ => Err(format!("Unknown confidence tier: {s}")),
        }
    }
}

impl Default for ConfidenceTier {
    fn default() -> Self {
        ConfidenceTier::High
    }
}
