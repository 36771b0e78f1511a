use crate::auth::IdentityStrategy;
use crate::search::serpapi::DEFAULT_BASE_URL;
use anyhow::Context;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MAGIC_LINK_BASE_URL: &str = "http://localhost:5173/auth/verify";

pub struct Config {
    /// Without a key the sample catalog is searched instead
    pub serpapi_key: Option<String>,
    pub serpapi_base_url: String,
    pub identity: IdentityStrategy,
    pub magic_link_base_url: String,
    pub magic_link_ttl: chrono::Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            serpapi_key: lookup("SERPAPI_KEY").filter(|k| !k.trim().is_empty()),
            serpapi_base_url: lookup("SERPAPI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            identity: parse_or(&lookup, "HOSTEL_IDENTITY", IdentityStrategy::MagicLink)?,
            magic_link_base_url: lookup("MAGIC_LINK_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MAGIC_LINK_BASE_URL.to_string()),
            magic_link_ttl: chrono::Duration::minutes(parse_or(
                &lookup,
                "MAGIC_LINK_TTL_MINUTES",
                crate::auth::magic_link::DEFAULT_TTL_MINUTES,
            )?),
            http_timeout: Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30)?),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {} value: {}", key, raw)),
        None => {
            debug!("{key} not set, using default");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config(&[]).unwrap();
        assert!(cfg.serpapi_key.is_none());
        assert_eq!(cfg.serpapi_base_url, "https://serpapi.com");
        assert_eq!(cfg.identity, IdentityStrategy::MagicLink);
        assert_eq!(cfg.magic_link_base_url, DEFAULT_MAGIC_LINK_BASE_URL);
        assert_eq!(cfg.magic_link_ttl, chrono::Duration::minutes(15));
        assert_eq!(cfg.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("SERPAPI_KEY", "abc123"),
            ("HOSTEL_IDENTITY", "google"),
            ("MAGIC_LINK_TTL_MINUTES", "5"),
            ("HTTP_TIMEOUT_SECS", "10"),
        ])
        .unwrap();
        assert_eq!(cfg.serpapi_key.as_deref(), Some("abc123"));
        assert_eq!(cfg.identity, IdentityStrategy::Google);
        assert_eq!(cfg.magic_link_ttl, chrono::Duration::minutes(5));
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn blank_key_means_no_key() {
        assert!(config(&[("SERPAPI_KEY", "  ")]).unwrap().serpapi_key.is_none());
    }

    #[test]
    fn rejects_garbage_numbers() {
        assert!(config(&[("HTTP_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config(&[("HOSTEL_IDENTITY", "carrier-pigeon")]).is_err());
    }
}
