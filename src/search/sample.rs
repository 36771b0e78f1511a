use crate::models::Country;
use crate::search::traits::SearchProvider;
use crate::search::types::{PropertyImage, PropertyRecord, RatePerNight, RegionQuery};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

/// Offline provider serving a fixed catalog of hostels, used when no API key is configured
#[derive(Debug, Default)]
pub struct SampleProvider;

impl SampleProvider {
    pub fn new() -> Self {
        Self
    }
}

struct Sample {
    token: &'static str,
    name: &'static str,
    location: &'static str,
    country: Country,
    price: f64,
    rating: f64,
    image: &'static str,
    link: &'static str,
}

const SAMPLES: &[Sample] = &[
    Sample {
        token: "1",
        name: "Casa Hostel",
        location: "Mexico City",
        country: Country::Mexico,
        price: 450.0,
        rating: 8.5,
        image: "https://images.unsplash.com/photo-1555854877-bab0e564b8d5?w=300&h=200&fit=crop",
        link: "https://www.hostelworld.com/hostel/123456",
    },
    Sample {
        token: "2",
        name: "Dragonfly Hostel",
        location: "Ho Chi Minh City",
        country: Country::Vietnam,
        price: 320.0,
        rating: 9.1,
        image: "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=300&h=200&fit=crop",
        link: "https://www.hostelworld.com/hostel/234567",
    },
    Sample {
        token: "3",
        name: "Copacabana Backpackers",
        location: "Rio de Janeiro",
        country: Country::Brazil,
        price: 380.0,
        rating: 8.2,
        image: "https://images.unsplash.com/photo-1483729558449-99ef09a8c325?w=300&h=200&fit=crop",
        link: "https://www.hostelworld.com/hostel/345678",
    },
];

#[async_trait]
impl SearchProvider for SampleProvider {
    async fn search(&self, query: &RegionQuery) -> Result<Vec<PropertyRecord>> {
        info!("📋 Serving sample hostels for {}", query.country);

        Ok(SAMPLES
            .iter()
            .filter(|s| s.country == query.country)
            .map(|s| PropertyRecord {
                property_token: Some(s.token.to_string()),
                name: Some(s.name.to_string()),
                location: Some(s.location.to_string()),
                rate_per_night: Some(RatePerNight {
                    lowest: None,
                    extracted_lowest: Some(Value::from(s.price)),
                }),
                overall_rating: Some(Value::from(s.rating)),
                images: vec![PropertyImage {
                    thumbnail: Some(s.image.to_string()),
                    original_image: None,
                }],
                link: Some(s.link.to_string()),
            })
            .collect())
    }

    fn source_name(&self) -> &'static str {
        "Samples"
    }
}
