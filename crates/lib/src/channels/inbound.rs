//! Inbound message event as posted by the messaging platform webhook.

/// One inbound message: text body and sender address. The only per-request input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub body: String,
    pub sender: String,
}

impl InboundEvent {
    pub fn new(body: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            sender: sender.into(),
        }
    }
}
