//! Recording fakes for the external collaborators, shared by unit tests.

use crate::analytics::{Analytics, AnalyticsError, Interaction};
use crate::channels::{MessagingError, Messenger};
use crate::llm::{LlmError, TextGenerator};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Template { to: String, sid: String },
    Text { to: String, body: String },
}

#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<Sent>>,
    pub fail: bool,
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_template(&self, to: &str, template_sid: &str) -> Result<String, MessagingError> {
        if self.fail {
            return Err(MessagingError::Api("503 unavailable".to_string()));
        }
        let mut g = self.sent.lock().unwrap();
        g.push(Sent::Template {
            to: to.to_string(),
            sid: template_sid.to_string(),
        });
        Ok(format!("SM{}", g.len()))
    }

    async fn send_text(&self, to: &str, body: &str) -> Result<String, MessagingError> {
        if self.fail {
            return Err(MessagingError::Api("503 unavailable".to_string()));
        }
        let mut g = self.sent.lock().unwrap();
        g.push(Sent::Text {
            to: to.to_string(),
            body: body.to_string(),
        });
        Ok(format!("SM{}", g.len()))
    }
}

/// Answers every prompt with `reply` (or a malformed-response error when None) and keeps the prompts.
pub struct ScriptedGenerator {
    pub prompts: Mutex<Vec<String>>,
    pub reply: Option<String>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            reply: Some(reply.to_string()),
        }
    }

    pub fn malformed() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            reply: None,
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| LlmError::Malformed("candidates[0] missing".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsCall {
    AddUser { name: String, phone_number: String },
    AddInteraction(Interaction),
    UserSummary(String),
    NewsFeedDigest(String),
}

#[derive(Default)]
pub struct RecordingAnalytics {
    pub calls: Mutex<Vec<AnalyticsCall>>,
    pub fail_writes: bool,
    /// `add_interaction` never completes.
    pub stall_writes: bool,
}

impl RecordingAnalytics {
    pub fn calls(&self) -> Vec<AnalyticsCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Yield until at least `n` calls are recorded (background writes), then return them.
    pub async fn wait_for_calls(&self, n: usize) -> Vec<AnalyticsCall> {
        for _ in 0..100 {
            if self.calls.lock().unwrap().len() >= n {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.calls()
    }
}

#[async_trait]
impl Analytics for RecordingAnalytics {
    async fn add_user(&self, name: &str, phone_number: &str) -> Result<(), AnalyticsError> {
        self.calls.lock().unwrap().push(AnalyticsCall::AddUser {
            name: name.to_string(),
            phone_number: phone_number.to_string(),
        });
        if self.fail_writes {
            return Err(AnalyticsError::Api("500 down".to_string()));
        }
        Ok(())
    }

    async fn add_interaction(&self, interaction: &Interaction) -> Result<(), AnalyticsError> {
        self.calls
            .lock()
            .unwrap()
            .push(AnalyticsCall::AddInteraction(interaction.clone()));
        if self.stall_writes {
            std::future::pending::<()>().await;
        }
        if self.fail_writes {
            return Err(AnalyticsError::Api("500 down".to_string()));
        }
        Ok(())
    }

    async fn user_summary(&self, phone_number: &str) -> Result<String, AnalyticsError> {
        self.calls
            .lock()
            .unwrap()
            .push(AnalyticsCall::UserSummary(phone_number.to_string()));
        Ok("read 4 articles on climate policy".to_string())
    }

    async fn news_feed_digest(&self, phone_number: &str) -> Result<String, AnalyticsError> {
        self.calls
            .lock()
            .unwrap()
            .push(AnalyticsCall::NewsFeedDigest(phone_number.to_string()));
        Ok("elections, energy prices".to_string())
    }
}
