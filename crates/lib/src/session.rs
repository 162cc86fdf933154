//! Per-sender conversation state.
//!
//! Each sender address gets its own session holding the last link it submitted and
//! its registration progress (identity, then display name). Sessions are created on
//! first contact and live for the process lifetime unless idle pruning is enabled.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Sender address as received from the messaging platform (e.g. "whatsapp:+1555...").
pub type SenderId = String;

/// Conversation state for one sender.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Last URL-looking token submitted; overwritten by each new link, read (not cleared) on selection.
    pub last_link: Option<String>,
    /// Set once, from the first free-text message after the identity is recorded.
    pub user_display_name: Option<String>,
    /// Sender address captured on first contact.
    pub user_identity: Option<String>,
    pub last_seen: DateTime<Utc>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            last_link: None,
            user_display_name: None,
            user_identity: None,
            last_seen: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("display name cannot be set before the sender identity is recorded")]
    IdentityNotRecorded,
}

/// In-memory store of sessions keyed by sender.
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<SenderId, SessionState>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Return a clone of the sender's session, creating an empty one on first contact.
    pub async fn touch(&self, sender: &str) -> SessionState {
        let mut g = self.inner.write().await;
        let session = g
            .entry(sender.to_string())
            .or_insert_with(SessionState::new);
        session.last_seen = Utc::now();
        session.clone()
    }

    /// Return a clone of the session if it exists.
    pub async fn get(&self, sender: &str) -> Option<SessionState> {
        self.inner.read().await.get(sender).cloned()
    }

    /// Record the sender identity. Returns false if it was already recorded (the first value is kept).
    pub async fn record_identity(&self, sender: &str, identity: impl Into<String>) -> bool {
        let mut g = self.inner.write().await;
        let session = g
            .entry(sender.to_string())
            .or_insert_with(SessionState::new);
        if session.user_identity.is_some() {
            return false;
        }
        session.user_identity = Some(identity.into());
        true
    }

    pub async fn set_display_name(
        &self,
        sender: &str,
        name: impl Into<String>,
    ) -> Result<(), SessionError> {
        let mut g = self.inner.write().await;
        let session = g
            .get_mut(sender)
            .filter(|s| s.user_identity.is_some())
            .ok_or(SessionError::IdentityNotRecorded)?;
        session.user_display_name = Some(name.into());
        Ok(())
    }

    /// Store the link, overwriting any previous one.
    pub async fn set_last_link(&self, sender: &str, link: impl Into<String>) {
        let mut g = self.inner.write().await;
        let session = g
            .entry(sender.to_string())
            .or_insert_with(SessionState::new);
        session.last_link = Some(link.into());
    }

    pub async fn last_link(&self, sender: &str) -> Option<String> {
        self.inner
            .read()
            .await
            .get(sender)
            .and_then(|s| s.last_link.clone())
    }

    /// Remove sessions not seen within `ttl`. Returns how many were removed.
    /// A `ttl` reaching past the earliest representable time keeps every session.
    pub async fn prune_idle(&self, ttl: Duration) -> usize {
        let Some(cutoff) = Utc::now().checked_sub_signed(ttl) else {
            return 0;
        };
        let mut g = self.inner.write().await;
        let before = g.len();
        g.retain(|_, s| s.last_seen >= cutoff);
        before - g.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
