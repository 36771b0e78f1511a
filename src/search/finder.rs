use crate::budget::Budget;
use crate::models::{Country, Listing};
use crate::search::traits::SearchProvider;
use crate::search::types::{PropertyRecord, RegionQuery};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Raw candidates kept per region before the global budget filter
pub const MAX_PER_REGION: usize = 20;

/// Listings shown after ranking
pub const MAX_RESULTS: usize = 50;

pub const DEFAULT_RATING: f64 = 8.0;

pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1555854877-bab0e564b8d5?w=300&h=200&fit=crop";

/// Runs one search per region and ranks the merged result
#[derive(Clone)]
pub struct HostelFinder {
    provider: Arc<dyn SearchProvider>,
}

impl HostelFinder {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub fn source_name(&self) -> &'static str {
        self.provider.source_name()
    }

    /// Search every region concurrently, then filter, sort and truncate.
    /// Regions that fail contribute nothing; the call itself never fails.
    pub async fn find(&self, budget: &Budget, regions: &[Country]) -> Vec<Listing> {
        if regions.is_empty() {
            debug!("No regions selected, skipping search");
            return Vec::new();
        }

        info!(
            source = self.provider.source_name(),
            regions = regions.len(),
            daily_ceiling = budget.daily_ceiling,
            "Searching hostels"
        );

        let searches = regions
            .iter()
            .map(|country| self.search_region(*country, budget.daily_ceiling));

        // join_all keeps input order, so the merge is deterministic
        let merged: Vec<Listing> = join_all(searches).await.into_iter().flatten().collect();

        let ranked = rank(budget, merged);
        info!("✅ Found {} affordable hostels", ranked.len());
        ranked
    }

    async fn search_region(&self, country: Country, max_price: u64) -> Vec<Listing> {
        let query = RegionQuery { country, max_price };
        match self.provider.search(&query).await {
            Ok(records) => {
                let listings = region_listings(&query, records);
                debug!(%country, count = listings.len(), "Region search done");
                listings
            }
            Err(e) => {
                warn!(%country, error = %e, "Region search failed, skipping");
                Vec::new()
            }
        }
    }
}

/// Turn one region's raw records into listings: drop unpriced or over-ceiling
/// records, keep the first 20, fill defaults
pub fn region_listings(query: &RegionQuery, records: Vec<PropertyRecord>) -> Vec<Listing> {
    let max_price = query.max_price as f64;

    records
        .into_iter()
        .filter_map(|record| {
            let price = record.nightly_price()?;
            (price <= max_price).then_some((record, price))
        })
        .take(MAX_PER_REGION)
        .enumerate()
        .map(|(index, (record, price))| to_listing(query.country, index, record, price))
        .collect()
}

fn to_listing(country: Country, index: usize, record: PropertyRecord, price: f64) -> Listing {
    let image = record
        .thumbnail()
        .unwrap_or(PLACEHOLDER_IMAGE)
        .to_string();
    let rating = record.rating().unwrap_or(DEFAULT_RATING);
    let name = record
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Unknown Hostel".to_string());
    let booking_url = record
        .link
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| fallback_booking_url(&name));

    Listing {
        id: record
            .property_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("hostel-{}", index)),
        location: record
            .location
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| country.to_string()),
        country,
        price,
        rating,
        image,
        booking_url,
        name,
    }
}

/// HostelWorld search page for a listing without its own link
pub fn fallback_booking_url(name: &str) -> String {
    format!(
        "https://www.hostelworld.com/search?search={}",
        urlencoding::encode(name)
    )
}

/// Keep what the full stay budget covers, best rated first, capped at 50.
/// Equal ratings keep their merge order.
pub fn rank(budget: &Budget, mut listings: Vec<Listing>) -> Vec<Listing> {
    listings.retain(|listing| budget.affords(listing.price));
    listings.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    listings.truncate(MAX_RESULTS);
    listings
}
