use crate::domain::entities::property::PropertyRecord;
use crate::domain::ports::listing_provider::{matches_request, FetchOutcome, ListingProvider, ProviderError};
use async_trait::async_trait;

/// Serves listings from a table held in memory.
pub struct InMemoryProvider {
    records: Vec<PropertyRecord>,
}

impl InMemoryProvider {
    pub fn new(records: Vec<PropertyRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self { records: vec![] }
    }
}

#[async_trait]
impl ListingProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn fetch(&self, city: &str, property_type: &str) -> Result<FetchOutcome, ProviderError> {
        Ok(FetchOutcome::from_records(
            self.records
                .iter()
                .filter(|r| matches_request(r, city, property_type))
                .cloned()
                .collect(),
        ))
    }
}
