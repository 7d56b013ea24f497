use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::error::DomainError;
use crate::domain::values::confidence::ConfidenceTier;

#[derive(Parser)]
#[command(name = "realtyscout", about = "Undervalued-property detection and daily opportunity alerts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find undervalued listings in a listing table
    Scan {
        /// JSON file with an array of listings
        #[arg(long)]
        listings: String,
        /// Only consider listings of this city
        #[arg(long, default_value = "")]
        city: String,
        /// Override the maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Score a discount percentage
    Score {
        /// Discount vs. district mean, in percent
        discount: f64,
        /// Confidence tier (low, medium, high)
        #[arg(long, default_value = "high")]
        confidence: String,
    },
    /// Run the daily alert gate for a city
    Alert {
        city: String,
        /// Property type (empty matches every type)
        #[arg(long = "type", default_value = "")]
        property_type: String,
        /// Read listings from this JSON file instead of the live endpoint
        #[arg(long)]
        listings: Option<String>,
    },
    /// List stored alerts
    Alerts {
        #[arg(long)]
        city: Option<String>,
        /// Only today's alerts for --city, with the remaining daily budget
        #[arg(long, requires = "city")]
        today: bool,
        /// Only alerts generated on or after this date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "today")]
        since: Option<String>,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Descriptive price-per-m² statistics by district
    Stats {
        #[arg(long)]
        listings: String,
        #[arg(long, default_value = "")]
        city: String,
        /// Drop district outliers (1.5 x IQR) before summarizing
        #[arg(long)]
        filter_outliers: bool,
    },
}

pub fn parse_confidence(raw: &str) -> Result<ConfidenceTier, DomainError> {
    raw.parse().map_err(DomainError::InvalidInput)
}

/// Parse a `--since` argument in `YYYY-MM-DD` form.
pub fn parse_since(raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| DomainError::Parse(format!("invalid --since date {raw:?}: {e}")))
}
