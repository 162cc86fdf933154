//! Messaging platform (e.g. WhatsApp via Twilio).
//!
//! Inbound events arrive on the gateway webhook; outbound template and free-text
//! sends go through the [`Messenger`] trait. Replies to the webhook itself are TwiML.

mod inbound;
mod outbound;
mod twilio;
pub mod twiml;

pub use inbound::InboundEvent;
pub use outbound::{MessagingError, Messenger};
pub use twilio::TwilioMessenger;
