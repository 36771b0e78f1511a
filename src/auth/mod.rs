//! Sign-in strategies.
//!
//! Every strategy turns a [`Credential`] into the same [`Identity`]. Which one
//! is active is picked once, from configuration.

pub mod error;
pub mod id_token;
pub mod magic_link;
pub mod session;
pub mod token_store;

pub use error::AuthError;
pub use id_token::IdTokenProvider;
pub use magic_link::{MagicLink, MagicLinkProvider};
pub use session::{Session, SessionStore};
pub use token_store::{MemoryTokenStore, TokenRecord, TokenStore};

use crate::models::Identity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityStrategy {
    /// Google Identity Services ID token
    Google,
    /// Any other OpenID Connect provider's ID token
    Oidc,
    /// Emailed single-use sign-in link
    MagicLink,
}

impl fmt::Display for IdentityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentityStrategy::Google => "google",
            IdentityStrategy::Oidc => "oidc",
            IdentityStrategy::MagicLink => "magic-link",
        })
    }
}

impl FromStr for IdentityStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(IdentityStrategy::Google),
            "oidc" => Ok(IdentityStrategy::Oidc),
            "magic-link" | "magic_link" | "email" => Ok(IdentityStrategy::MagicLink),
            other => anyhow::bail!(
                "Unknown identity strategy '{}' (expected google, oidc or magic-link)",
                other
            ),
        }
    }
}

/// What the user hands back after the out-of-band ceremony
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    /// Compact JWT from an OAuth/OIDC provider
    IdToken(String),
    /// The redirect URL a magic link pointed at
    MagicLink(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, credential: &Credential) -> Result<Identity, AuthError>;

    fn strategy(&self) -> IdentityStrategy;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_strategy_names() {
        assert_eq!("google".parse::<IdentityStrategy>().unwrap(), IdentityStrategy::Google);
        assert_eq!("OIDC".parse::<IdentityStrategy>().unwrap(), IdentityStrategy::Oidc);
        assert_eq!(
            "magic_link".parse::<IdentityStrategy>().unwrap(),
            IdentityStrategy::MagicLink
        );
        assert!("saml".parse::<IdentityStrategy>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for strategy in [
            IdentityStrategy::Google,
            IdentityStrategy::Oidc,
            IdentityStrategy::MagicLink,
        ] {
            assert_eq!(strategy.to_string().parse::<IdentityStrategy>().unwrap(), strategy);
        }
    }
}
