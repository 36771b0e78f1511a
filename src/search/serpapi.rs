use crate::search::traits::SearchProvider;
use crate::search::types::{records_from_values, PropertyRecord, RegionQuery};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// Body of a SerpAPI `google_hotels` search
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HotelsResponse {
    /// Kept raw so each record is decoded on its own
    properties: Option<Vec<Value>>,
    error: Option<String>,
}

/// SerpAPI Google Hotels provider
pub struct SerpApiProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SerpApiProvider {
    /// Create a provider; `base_url` is normally [`DEFAULT_BASE_URL`]
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hostel-list/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/search.json", self.base_url)
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn search(&self, query: &RegionQuery) -> Result<Vec<PropertyRecord>> {
        let q = query.search_text();
        info!(country = %query.country, max_price = query.max_price, "Searching SerpAPI");
        debug!("Fetching {} q={:?}", self.endpoint(), q);

        let response = self
            .client
            .get(self.endpoint())
            .query(&[
                ("engine", "google_hotels"),
                ("q", q.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to query SerpAPI for {}", query.country))?;

        if !response.status().is_success() {
            warn!("SerpAPI returned status: {}", response.status());
            anyhow::bail!(
                "SerpAPI search for {} failed: {}",
                query.country,
                response.status()
            );
        }

        let body: HotelsResponse = response
            .json()
            .await
            .context("Failed to parse SerpAPI response")?;

        if let Some(error) = body.error {
            anyhow::bail!("SerpAPI reported an error for {}: {}", query.country, error);
        }

        let raw = body.properties.unwrap_or_default();
        let total = raw.len();
        let records = records_from_values(raw);
        debug!(
            country = %query.country,
            count = records.len(),
            skipped = total - records.len(),
            "Received property records"
        );

        Ok(records)
    }

    fn source_name(&self) -> &'static str {
        "SerpAPI"
    }
}
