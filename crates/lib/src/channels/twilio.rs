//! Twilio channel: send template (ContentSid) and free-text messages via the Messages API.

use crate::channels::outbound::{MessagingError, Messenger};
use async_trait::async_trait;
use serde::Deserialize;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: Option<String>,
}

/// Twilio connector: posts form-encoded messages with basic auth (account sid / auth token).
pub struct TwilioMessenger {
    api_base: String,
    account_sid: Option<String>,
    auth_token: Option<String>,
    from: String,
    client: reqwest::Client,
}

impl TwilioMessenger {
    pub fn new(
        api_base: Option<String>,
        account_sid: Option<String>,
        auth_token: Option<String>,
        from: impl Into<String>,
    ) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| TWILIO_API_BASE.to_string());
        Self {
            api_base,
            account_sid,
            auth_token,
            from: from.into(),
            client: reqwest::Client::new(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), MessagingError> {
        let sid = self
            .account_sid
            .as_deref()
            .ok_or(MessagingError::NotConfigured("account sid"))?;
        let token = self
            .auth_token
            .as_deref()
            .ok_or(MessagingError::NotConfigured("auth token"))?;
        Ok((sid, token))
    }

    /// POST /2010-04-01/Accounts/{sid}/Messages.json with the given form fields; returns the message sid.
    async fn create_message(&self, fields: &[(&str, &str)]) -> Result<String, MessagingError> {
        let (sid, token) = self.credentials()?;
        let url = format!("{}/2010-04-01/Accounts/{}/Messages.json", self.api_base, sid);
        let res = self
            .client
            .post(&url)
            .basic_auth(sid, Some(token))
            .form(fields)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(MessagingError::Api(format!("create message failed: {} {}", status, body)));
        }
        let data: MessageResource = res.json().await?;
        data.sid.ok_or(MessagingError::Malformed("sid missing"))
    }
}

#[async_trait]
impl Messenger for TwilioMessenger {
    async fn send_template(&self, to: &str, template_sid: &str) -> Result<String, MessagingError> {
        let message_sid = self
            .create_message(&[("From", self.from.as_str()), ("To", to), ("ContentSid", template_sid)])
            .await?;
        log::debug!("twilio: template {} sent to {} as {}", template_sid, to, message_sid);
        Ok(message_sid)
    }

    async fn send_text(&self, to: &str, body: &str) -> Result<String, MessagingError> {
        let message_sid = self
            .create_message(&[("From", self.from.as_str()), ("To", to), ("Body", body)])
            .await?;
        log::debug!("twilio: text message sent to {} as {}", to, message_sid);
        Ok(message_sid)
    }
}
