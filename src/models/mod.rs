use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Countries the hostel search covers, in catalog order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Country {
    Mexico,
    Colombia,
    Brazil,
    Vietnam,
    Thailand,
}

impl Country {
    pub const ALL: [Country; 5] = [
        Country::Mexico,
        Country::Colombia,
        Country::Brazil,
        Country::Vietnam,
        Country::Thailand,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Country::Mexico => "Mexico",
            Country::Colombia => "Colombia",
            Country::Brazil => "Brazil",
            Country::Vietnam => "Vietnam",
            Country::Thailand => "Thailand",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Country {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Country::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown country '{}' (expected one of: Mexico, Colombia, Brazil, Vietnam, Thailand)",
                    wanted
                )
            })
    }
}

/// A hostel surfaced to the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub location: String,
    pub country: Country,
    /// Lowest nightly rate, in the provider's currency units
    pub price: f64,
    /// Overall rating on a 0-10 scale
    pub rating: f64,
    pub image: String,
    pub booking_url: String,
}

impl Listing {
    /// Cost of a 30-night stay at the nightly rate
    pub fn monthly_stay(&self) -> f64 {
        self.price * 30.0
    }
}

/// Who signed in, as reported by an identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_country_names_case_insensitively() {
        assert_eq!("vietnam".parse::<Country>().unwrap(), Country::Vietnam);
        assert_eq!(" Brazil ".parse::<Country>().unwrap(), Country::Brazil);
        assert!("Peru".parse::<Country>().is_err());
    }

    #[test]
    fn catalog_order_drives_ordering() {
        let mut countries = vec![Country::Thailand, Country::Mexico, Country::Brazil];
        countries.sort();
        assert_eq!(
            countries,
            vec![Country::Mexico, Country::Brazil, Country::Thailand]
        );
    }
}
