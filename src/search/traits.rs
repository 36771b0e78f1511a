use crate::search::types::{PropertyRecord, RegionQuery};
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for all accommodation search backends
/// A provider answers one region at a time; ranking happens in the finder
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Fetch raw property records for a single region
    async fn search(&self, query: &RegionQuery) -> Result<Vec<PropertyRecord>>;

    /// Get the name of the search backend
    fn source_name(&self) -> &'static str;
}
