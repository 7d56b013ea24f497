use crate::domain::entities::property::PropertyRecord;
use crate::domain::ports::listing_provider::{matches_request, FetchOutcome, ListingProvider, ProviderError};
use async_trait::async_trait;
use std::path::PathBuf;

/// Reads a listing table saved as a JSON array of listing objects.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the whole table without any city or type filtering.
    pub async fn load_all(&self) -> Result<Vec<PropertyRecord>, ProviderError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ProviderError::Config(format!("Cannot read {}: {e}", self.path.display()))
        })?;
        if raw.trim().is_empty() {
            return Ok(vec![]);
        }
        serde_json::from_str(&raw)
            .map_err(|e| ProviderError::Parse(format!("{}: {e}", self.path.display())))
    }
}

#[async_trait]
impl ListingProvider for JsonFileProvider {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn fetch(&self, city: &str, property_type: &str) -> Result<FetchOutcome, ProviderError> {
        let records = self.load_all().await?;
        Ok(FetchOutcome::from_records(
            records
                .into_iter()
                .filter(|r| matches_request(r, city, property_type))
                .collect(),
        ))
    }
}
