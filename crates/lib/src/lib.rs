//! newsrelay core library: per-sender sessions, the conversation router and action
//! dispatcher, clients for the messaging, generative-text and analytics backends,
//! and the webhook gateway used by the CLI.

pub mod action;
pub mod analytics;
pub mod channels;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod init;
pub mod llm;
pub mod router;
pub mod session;

#[cfg(test)]
mod testing;
