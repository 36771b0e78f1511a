use crate::models::Country;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Search parameters for one region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionQuery {
    /// Country to search in
    pub country: Country,
    /// Highest acceptable nightly rate (the daily ceiling)
    pub max_price: u64,
}

impl RegionQuery {
    /// Free-text query sent to the hotel search engine
    pub fn search_text(&self) -> String {
        format!("hostels in {} under ${}", self.country, self.max_price)
    }
}

/// Property record as returned by the search provider; every field is optional
/// and loosely typed, since the provider is not consistent about shapes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyRecord {
    pub property_token: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub rate_per_night: Option<RatePerNight>,
    /// Usually a number, sometimes a string or null
    pub overall_rating: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<PropertyImage>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RatePerNight {
    /// Either a number or a display string such as "$21"
    pub lowest: Option<Value>,
    pub extracted_lowest: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyImage {
    pub thumbnail: Option<String>,
    pub original_image: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode each raw record on its own so one malformed entry only costs itself
pub fn records_from_values(values: Vec<Value>) -> Vec<PropertyRecord> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(index, error = %e, "Skipping malformed property record");
                None
            }
        })
        .collect()
}

impl PropertyRecord {
    /// Lowest nightly rate, if the record carries one we can compare against a budget
    pub fn nightly_price(&self) -> Option<f64> {
        let rate = self.rate_per_night.as_ref()?;
        let usable = |value: &Option<Value>| {
            value
                .as_ref()
                .and_then(number_from_value)
                .filter(|price| *price >= 0.0)
        };
        usable(&rate.extracted_lowest).or_else(|| usable(&rate.lowest))
    }

    pub fn rating(&self) -> Option<f64> {
        self.overall_rating.as_ref().and_then(number_from_value)
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.images
            .first()
            .and_then(|image| image.thumbnail.as_deref())
            .filter(|url| !url.is_empty())
    }
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => first_number(s),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// First number in a display string: "$12.50 - $20" is 12.5, "$1,204" is 1204,
/// "1.204,00 €" is 1204. Separators that fit no grouping give `None`.
fn first_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let token = token.trim_end_matches([',', '.']);

    let normalized = match (token.rfind(','), token.rfind('.')) {
        (None, None) => token.to_string(),
        (Some(comma), Some(dot)) if comma > dot => token.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => token.replace(',', ""),
        (Some(_), None) => {
            if is_grouped(token, ',') {
                token.replace(',', "")
            } else if token.matches(',').count() == 1 {
                token.replace(',', ".")
            } else {
                return None;
            }
        }
        (None, Some(_)) => {
            if token.matches('.').count() == 1 {
                token.to_string()
            } else if is_grouped(token, '.') {
                token.replace('.', "")
            } else {
                return None;
            }
        }
    };

    normalized.parse().ok()
}

/// Every group after the first is exactly three digits
fn is_grouped(token: &str, separator: char) -> bool {
    let mut groups = token.split(separator);
    let lead = groups.next().unwrap_or("");
    !lead.is_empty() && lead.len() <= 3 && groups.all(|g| g.len() == 3)
}
