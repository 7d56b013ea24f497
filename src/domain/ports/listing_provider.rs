use crate::domain::entities::property::PropertyRecord;
use crate::domain::error::DomainError;
use async_trait::async_trait;
use thiserror::Error;

/// What a provider found for a (city, property type) request.
///
/// Keeping `Empty` apart from errors lets callers tell "the market has no
/// listings" from "the fetch failed".
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Records(Vec<PropertyRecord>),
    Empty,
}

impl FetchOutcome {
    pub fn from_records(records: Vec<PropertyRecord>) -> Self {
        if records.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Records(records)
        }
    }

    pub fn into_records(self) -> Vec<PropertyRecord> {
        match self {
            FetchOutcome::Records(records) => records,
            FetchOutcome::Empty => Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP or network error
    #[error("Network error: {0}")]
    Network(String),
    /// Response or file parsing error
    #[error("Parse error: {0}")]
    Parse(String),
    /// Configuration error (missing URL, unreadable path, etc.)
    #[error("Config error: {0}")]
    Config(String),
}

impl From<ProviderError> for DomainError {
    fn from(e: ProviderError) -> Self {
        DomainError::Provider(e.to_string())
    }
}

/// A source of current listings.
#[async_trait]
pub trait ListingProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch listings for `city`. An empty `property_type` matches every type.
    async fn fetch(&self, city: &str, property_type: &str) -> Result<FetchOutcome, ProviderError>;
}

/// Case-insensitive (city, type) match shared by the provider adapters.
pub fn matches_request(record: &PropertyRecord, city: &str, property_type: &str) -> bool {
    let city = city.trim();
    let property_type = property_type.trim();
    (city.is_empty() || record.city.trim().eq_ignore_ascii_case(city))
        && (property_type.is_empty()
            || record.property_type.trim().eq_ignore_ascii_case(property_type))
}
