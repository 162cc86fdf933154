//! Analytics backend: user registry, interaction log and history digests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("analytics request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("analytics api error: {0}")]
    Api(String),
    #[error("analytics response malformed: {0}")]
    Malformed(&'static str),
    #[error("analytics backend disabled")]
    Disabled,
}

/// One analysed exchange, as logged to `addInteraction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub user_phone_number: String,
    /// Template before substitution.
    pub prompt: String,
    pub result: String,
    pub link: String,
}

#[async_trait]
pub trait Analytics: Send + Sync {
    async fn add_user(&self, name: &str, phone_number: &str) -> Result<(), AnalyticsError>;
    async fn add_interaction(&self, interaction: &Interaction) -> Result<(), AnalyticsError>;
    /// `userSummary` text for the user's past interactions.
    async fn user_summary(&self, phone_number: &str) -> Result<String, AnalyticsError>;
    /// `recommendedTopics` text for the user's digest.
    async fn news_feed_digest(&self, phone_number: &str) -> Result<String, AnalyticsError>;
}

/// JSON-over-POST client for the analytics service.
#[derive(Clone)]
pub struct HttpAnalytics {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhoneRequest<'a> {
    phone_number: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddUserRequest<'a> {
    name: &'a str,
    phone_number: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    user_summary: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DigestResponse {
    recommended_topics: Option<String>,
}

impl HttpAnalytics {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<reqwest::Response, AnalyticsError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let res = self.client.post(&url).json(body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AnalyticsError::Api(format!("{} {}: {}", endpoint, status, body)));
        }
        Ok(res)
    }
}

#[async_trait]
impl Analytics for HttpAnalytics {
    async fn add_user(&self, name: &str, phone_number: &str) -> Result<(), AnalyticsError> {
        self.post("addUser", &AddUserRequest { name, phone_number })
            .await?;
        Ok(())
    }

    async fn add_interaction(&self, interaction: &Interaction) -> Result<(), AnalyticsError> {
        self.post("addInteraction", interaction).await?;
        Ok(())
    }

    async fn user_summary(&self, phone_number: &str) -> Result<String, AnalyticsError> {
        let data: SummaryResponse = self
            .post("userSummary", &PhoneRequest { phone_number })
            .await?
            .json()
            .await?;
        data.user_summary
            .ok_or(AnalyticsError::Malformed("userSummary missing"))
    }

    async fn news_feed_digest(&self, phone_number: &str) -> Result<String, AnalyticsError> {
        let data: DigestResponse = self
            .post("newsFeedDigest", &PhoneRequest { phone_number })
            .await?
            .json()
            .await?;
        data.recommended_topics
            .ok_or(AnalyticsError::Malformed("recommendedTopics missing"))
    }
}

/// Stand-in used when `analytics.enabled` is false: writes succeed silently, reads fail.
pub struct DisabledAnalytics;

#[async_trait]
impl Analytics for DisabledAnalytics {
    async fn add_user(&self, _name: &str, _phone_number: &str) -> Result<(), AnalyticsError> {
        Ok(())
    }

    async fn add_interaction(&self, _interaction: &Interaction) -> Result<(), AnalyticsError> {
        Ok(())
    }

    async fn user_summary(&self, _phone_number: &str) -> Result<String, AnalyticsError> {
        Err(AnalyticsError::Disabled)
    }

    async fn news_feed_digest(&self, _phone_number: &str) -> Result<String, AnalyticsError> {
        Err(AnalyticsError::Disabled)
    }
}
