//! Conversation router: classify one inbound message, update the sender's session,
//! and either reply directly or hand off to the dispatcher.
//!
//! Classification order: menu selection (digits only), link submission, then
//! registration / fallback text.

use crate::action::Action;
use crate::analytics::Analytics;
use crate::channels::{twiml, InboundEvent, Messenger};
use crate::dispatch::Dispatcher;
use crate::error::RelayError;
use crate::session::SessionStore;
use std::sync::Arc;

/// Substrings that mark a token as a link.
const LINK_MARKERS: [&str; 3] = ["http://", "https://", "www."];

const SELECTION_ACK: &str = "Here's what I could find and analyze for you.";
const LINK_ACK: &str = "Please choose an option that you want to perform on the article link you provided.";
const LINK_REQUEST: &str = "Please provide a valid link for an article.";
const WELCOME: &str = "Welcome! Please enter your name to begin.";
const REGISTRATION_FAILED: &str = "Sorry, we couldn't register you. Please try again.";

/// Reply to the webhook: zero or one text message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundReply {
    pub text: Option<String>,
}

impl OutboundReply {
    pub fn empty() -> Self {
        Self { text: None }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn to_twiml(&self) -> String {
        twiml::message_response(self.text.as_deref())
    }
}

/// What an inbound body is, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    /// Trimmed body made only of ASCII digits.
    Selection(&'a str),
    /// First whitespace-delimited token containing a link marker, as written.
    Link(&'a str),
    Text(&'a str),
}

pub fn classify(body: &str) -> Classified<'_> {
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Classified::Selection(trimmed);
    }
    if let Some(link) = first_link(trimmed) {
        return Classified::Link(link);
    }
    Classified::Text(trimmed)
}

/// Leftmost token containing a marker (case-insensitive). Trailing punctuation is kept.
fn first_link(body: &str) -> Option<&str> {
    body.split_whitespace().find(|token| {
        let lower = token.to_ascii_lowercase();
        LINK_MARKERS.iter().any(|m| lower.contains(m))
    })
}

/// Template ids sent at fixed points of the conversation. Absent ids fall back to text replies.
#[derive(Debug, Clone, Default)]
pub struct ConversationTemplates {
    pub intro: Option<String>,
    pub options: Option<String>,
}

pub struct ConversationRouter {
    sessions: Arc<SessionStore>,
    dispatcher: Dispatcher,
    messenger: Arc<dyn Messenger>,
    analytics: Arc<dyn Analytics>,
    templates: ConversationTemplates,
}

impl ConversationRouter {
    pub fn new(
        sessions: Arc<SessionStore>,
        messenger: Arc<dyn Messenger>,
        generator: Arc<dyn crate::llm::TextGenerator>,
        analytics: Arc<dyn Analytics>,
        templates: ConversationTemplates,
    ) -> Self {
        let dispatcher = Dispatcher::new(messenger.clone(), generator, analytics.clone());
        Self {
            sessions,
            dispatcher,
            messenger,
            analytics,
            templates,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Handle one event. Unknown selections and selections without a link become user-facing
    /// replies; only backend failures are returned as errors.
    pub async fn handle(&self, event: &InboundEvent) -> Result<OutboundReply, RelayError> {
        match self.route(event).await {
            Ok(reply) => Ok(reply),
            Err(e) => match e.user_reply() {
                Some(text) => {
                    log::info!("router: {} from {}", e, event.sender);
                    Ok(OutboundReply::text(text))
                }
                None => Err(e),
            },
        }
    }

    async fn route(&self, event: &InboundEvent) -> Result<OutboundReply, RelayError> {
        let sender = event.sender.as_str();
        match classify(&event.body) {
            Classified::Selection(digits) => self.on_selection(digits, sender).await,
            Classified::Link(link) => self.on_link(link, sender).await,
            Classified::Text(text) => self.on_text(text, sender).await,
        }
    }

    async fn on_selection(&self, digits: &str, sender: &str) -> Result<OutboundReply, RelayError> {
        let action = Action::from_selection(digits)
            .ok_or_else(|| RelayError::UnrecognizedSelection(digits.to_string()))?;
        let session = self.sessions.touch(sender).await;
        let link = session.last_link.as_deref();
        if action.requires_link() && link.is_none() {
            return Err(RelayError::NoLinkOnFile);
        }
        let identity = session.user_identity.as_deref().unwrap_or(sender);
        log::info!("router: {} selected {} (link: {:?})", sender, action, link);
        self.dispatcher
            .dispatch(action, link, sender, identity)
            .await?;
        Ok(OutboundReply::text(SELECTION_ACK))
    }

    /// Session changes are committed only after the options template is out.
    async fn on_link(&self, link: &str, sender: &str) -> Result<OutboundReply, RelayError> {
        self.sessions.touch(sender).await;
        let reply = match &self.templates.options {
            Some(sid) => {
                let message_sid = self.messenger.send_template(sender, sid).await?;
                log::debug!("router: options template sent as {}", message_sid);
                OutboundReply::text(LINK_ACK)
            }
            None => OutboundReply::text(format!("{}\n\n{}", LINK_ACK, Action::menu_text())),
        };
        self.sessions.set_last_link(sender, link).await;
        log::info!("router: stored link for {}: {}", sender, link);
        Ok(reply)
    }

    async fn on_text(&self, text: &str, sender: &str) -> Result<OutboundReply, RelayError> {
        let session = self.sessions.touch(sender).await;
        if session.user_display_name.is_some() {
            return Ok(OutboundReply::text(LINK_REQUEST));
        }
        let Some(identity) = session.user_identity else {
            log::info!("router: first contact from {}", sender);
            let reply = match &self.templates.intro {
                Some(sid) => {
                    let message_sid = self.messenger.send_template(sender, sid).await?;
                    log::debug!("router: intro template sent as {}", message_sid);
                    OutboundReply::empty()
                }
                None => OutboundReply::text(WELCOME),
            };
            self.sessions.record_identity(sender, sender).await;
            return Ok(reply);
        };
        if text.is_empty() {
            return Ok(OutboundReply::text(WELCOME));
        }
        if let Err(e) = self.analytics.add_user(text, &identity).await {
            log::warn!("router: registering {} failed: {}", identity, e);
            return Ok(OutboundReply::text(REGISTRATION_FAILED));
        }
        // Identity is recorded above, so this cannot fail.
        if let Err(e) = self.sessions.set_display_name(sender, text).await {
            log::warn!("router: {}", e);
        }
        log::info!("router: registered {} as {}", identity, text);
        Ok(OutboundReply::text(format!(
            "Thanks, {}! You're now registered. Send me a link to a news article to get started.",
            text
        )))
    }
}
