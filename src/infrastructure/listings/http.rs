use crate::domain::entities::property::PropertyRecord;
use crate::domain::ports::listing_provider::{matches_request, FetchOutcome, ListingProvider, ProviderError};
use async_trait::async_trait;

/// Live listing feed served as JSON by an HTTP endpoint.
///
/// Requests `GET {base_url}/listings?city=..&type=..` and expects either a
/// bare array of listings or an object with a `listings` array.
pub struct HttpListingProvider {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ListingsBody {
    Bare(Vec<PropertyRecord>),
    Wrapped { listings: Vec<PropertyRecord> },
}

impl HttpListingProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .user_agent(concat!("realtyscout/", env!("CARGO_PKG_VERSION")))
                .timeout(std::time::Duration::from_secs(20))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ListingProvider for HttpListingProvider {
    fn name(&self) -> &str {
        "live_data_provider"
    }

    async fn fetch(&self, city: &str, property_type: &str) -> Result<FetchOutcome, ProviderError> {
        if self.base_url.is_empty() {
            return Err(ProviderError::Config("Listings URL is empty".into()));
        }

        let url = format!("{}/listings", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("city", city), ("type", property_type)])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProviderError::Network(format!(
                "Listings API returned {} for {city}",
                resp.status()
            )));
        }

        let body: ListingsBody = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let records = match body {
            ListingsBody::Bare(records) => records,
            ListingsBody::Wrapped { listings } => listings,
        };

        // The endpoint may ignore query parameters; filter again locally.
        Ok(FetchOutcome::from_records(
            records
                .into_iter()
                .filter(|r| matches_request(r, city, property_type))
                .collect(),
        ))
    }
}
