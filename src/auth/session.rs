use crate::auth::IdentityStrategy;
use crate::models::Identity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

/// The signed-in user
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Session {
    pub identity: Identity,
    pub strategy: IdentityStrategy,
    pub established_at: DateTime<Utc>,
}

/// Holds at most one active session
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn establish(&self, identity: Identity, strategy: IdentityStrategy) -> Session {
        let session = Session {
            identity,
            strategy,
            established_at: Utc::now(),
        };
        *self.current.write().await = Some(session.clone());
        session
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn clear(&self) -> Option<Session> {
        self.current.write().await.take()
    }
}
