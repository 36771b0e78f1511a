use crate::auth::{AuthError, Credential, IdentityProvider, IdentityStrategy, TokenRecord, TokenStore};
use crate::models::Identity;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_TTL_MINUTES: i64 = 15;

const TOKEN_LEN: usize = 32;
const TOKEN_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A sign-in link ready to be emailed
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MagicLink {
    pub url: String,
    pub token: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Email sign-in: issue a single-use token, then redeem it from the link
pub struct MagicLinkProvider {
    store: Arc<dyn TokenStore>,
    base_url: Url,
    ttl: Duration,
}

impl MagicLinkProvider {
    pub fn new(store: Arc<dyn TokenStore>, base_url: &str) -> Result<Self> {
        Self::with_ttl(store, base_url, Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    pub fn with_ttl(store: Arc<dyn TokenStore>, base_url: &str, ttl: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid magic link base URL: {}", base_url))?;
        Ok(Self {
            store,
            base_url,
            ttl,
        })
    }

    pub async fn issue(&self, email: &str) -> Result<MagicLink, AuthError> {
        self.issue_at(email, Utc::now()).await
    }

    /// Record a fresh token for `email`, valid until `now + ttl`
    pub async fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<MagicLink, AuthError> {
        let email = normalize_email(email)?;
        self.store.purge_expired(now).await;
        let token = generate_token();
        let expires_at = now + self.ttl;

        self.store
            .insert(
                token.clone(),
                TokenRecord {
                    email: email.clone(),
                    expires_at,
                },
            )
            .await;

        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("token", &token)
            .append_pair("email", &email);

        info!(%email, %expires_at, "Issued magic link");

        Ok(MagicLink {
            url: url.to_string(),
            token,
            email,
            expires_at,
        })
    }

    /// Redeem `token` for `email`. The token is consumed on success and
    /// dropped once found expired.
    pub async fn verify_at(
        &self,
        token: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthError> {
        let record = self.store.get(token).await.ok_or(AuthError::TokenNotFound)?;

        if record.is_expired(now) {
            self.store.remove(token).await;
            warn!(email = %record.email, "Magic link expired");
            return Err(AuthError::TokenExpired);
        }

        if !record.email.eq_ignore_ascii_case(email.trim()) {
            warn!("Magic link presented with a different email");
            return Err(AuthError::EmailMismatch);
        }

        self.store.remove(token).await;
        info!(email = %record.email, "Magic link redeemed");

        Ok(identity_for(&record.email))
    }

    /// Redeem the link the user was redirected to
    pub async fn verify_link_at(&self, link: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let url = Url::parse(link.trim())
            .map_err(|e| AuthError::InvalidCredential(format!("not a URL: {}", e)))?;

        let param = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };

        let token = param("token")
            .ok_or_else(|| AuthError::InvalidCredential("link has no token".to_string()))?;
        let email = param("email")
            .ok_or_else(|| AuthError::InvalidCredential("link has no email".to_string()))?;

        self.verify_at(&token, &email, now).await
    }
}

#[async_trait]
impl IdentityProvider for MagicLinkProvider {
    async fn sign_in(&self, credential: &Credential) -> Result<Identity, AuthError> {
        match credential {
            Credential::MagicLink(link) => self.verify_link_at(link, Utc::now()).await,
            Credential::IdToken(_) => Err(AuthError::UnsupportedCredential {
                provider: "Magic link sign-in",
            }),
        }
    }

    fn strategy(&self) -> IdentityStrategy {
        IdentityStrategy::MagicLink
    }
}

fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_CHARS[rng.gen_range(0..TOKEN_CHARS.len())] as char)
        .collect()
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') => {
            Ok(email)
        }
        _ => Err(AuthError::InvalidEmail(email)),
    }
}

fn identity_for(email: &str) -> Identity {
    let name = email.split('@').next().unwrap_or(email).to_string();
    Identity {
        id: email.to_string(),
        name,
        email: email.to_string(),
        picture: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn provider() -> (Arc<MemoryTokenStore>, MagicLinkProvider) {
        let store = Arc::new(MemoryTokenStore::new());
        let provider =
            MagicLinkProvider::new(store.clone(), "http://localhost:5173/auth/verify").unwrap();
        (store, provider)
    }

    #[tokio::test]
    async fn issued_link_carries_token_and_email() {
        let (store, provider) = provider();
        let now = Utc::now();

        let link = provider.issue_at("Traveler@Example.com", now).await.unwrap();

        assert_eq!(link.token.len(), TOKEN_LEN);
        assert!(link.token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(link.email, "traveler@example.com");
        assert_eq!(link.expires_at, now + Duration::minutes(15));
        assert!(link.url.starts_with("http://localhost:5173/auth/verify?token="));
        assert!(link.url.contains("email=traveler%40example.com"));
        assert_eq!(
            store.get(&link.token).await,
            Some(TokenRecord {
                email: "traveler@example.com".to_string(),
                expires_at: now + Duration::minutes(15),
            })
        );
    }

    #[tokio::test]
    async fn redeems_once_within_ttl() {
        let (_, provider) = provider();
        let now = Utc::now();
        let link = provider.issue_at("ana@example.com", now).await.unwrap();

        let identity = provider
            .verify_link_at(&link.url, now + Duration::minutes(14))
            .await
            .unwrap();
        assert_eq!(identity.email, "ana@example.com");
        assert_eq!(identity.name, "ana");

        assert_eq!(
            provider.verify_link_at(&link.url, now).await,
            Err(AuthError::TokenNotFound)
        );
    }

    #[tokio::test]
    async fn rejects_link_used_after_sixteen_minutes() {
        let (store, provider) = provider();
        let now = Utc::now();
        let link = provider.issue_at("ana@example.com", now).await.unwrap();

        let result = provider
            .verify_at(&link.token, &link.email, now + Duration::minutes(16))
            .await;

        assert_eq!(result, Err(AuthError::TokenExpired));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn rejects_mismatched_email_and_keeps_token() {
        let (store, provider) = provider();
        let now = Utc::now();
        let link = provider.issue_at("ana@example.com", now).await.unwrap();

        let result = provider.verify_at(&link.token, "eve@example.com", now).await;

        assert_eq!(result, Err(AuthError::EmailMismatch));
        assert!(store.get(&link.token).await.is_some());
    }

    #[tokio::test]
    async fn rejects_unknown_token_and_bad_links() {
        let (_, provider) = provider();
        let now = Utc::now();

        assert_eq!(
            provider.verify_at("nope", "ana@example.com", now).await,
            Err(AuthError::TokenNotFound)
        );
        assert!(matches!(
            provider
                .verify_link_at("http://localhost:5173/auth/verify?email=a%40b.co", now)
                .await,
            Err(AuthError::InvalidCredential(_))
        ));
        assert!(matches!(
            provider.verify_link_at("not a url", now).await,
            Err(AuthError::InvalidCredential(_))
        ));
    }

    #[tokio::test]
    async fn refuses_malformed_email() {
        let (_, provider) = provider();
        for email in ["", "no-at-sign", "@example.com", "ana@localhost"] {
            assert!(matches!(
                provider.issue(email).await,
                Err(AuthError::InvalidEmail(_))
            ));
        }
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let store = Arc::new(MemoryTokenStore::new());
        assert!(MagicLinkProvider::new(store, "not a url").is_err());
    }
}
