use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// What a pending sign-in token was issued for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenRecord {
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Key-value store for pending tokens with expiry
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: String, record: TokenRecord);

    async fn get(&self, token: &str) -> Option<TokenRecord>;

    /// Delete a token, returning what it held
    async fn remove(&self, token: &str) -> Option<TokenRecord>;

    /// Drop every record already expired at `now`, returning how many went
    async fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}

/// Process-local token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: Mutex<HashMap<String, TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn insert(&self, token: String, record: TokenRecord) {
        self.records.lock().await.insert(token, record);
    }

    async fn get(&self, token: &str) -> Option<TokenRecord> {
        self.records.lock().await.get(token).cloned()
    }

    async fn remove(&self, token: &str) -> Option<TokenRecord> {
        self.records.lock().await.remove(token)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        before - records.len()
    }
}
