//! Outbound sends to the messaging platform.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("messaging request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("messaging api error: {0}")]
    Api(String),
    #[error("messaging response malformed: {0}")]
    Malformed(&'static str),
    #[error("messaging not configured: {0}")]
    NotConfigured(&'static str),
}

/// Sends messages to a recipient. Both variants return the provider-assigned message id.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a pre-registered template by its opaque id.
    async fn send_template(&self, to: &str, template_sid: &str) -> Result<String, MessagingError>;
    /// Send free-form text.
    async fn send_text(&self, to: &str, body: &str) -> Result<String, MessagingError>;
}
