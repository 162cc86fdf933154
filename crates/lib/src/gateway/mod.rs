//! Gateway: HTTP server receiving messaging-platform webhooks.
//!
//! `POST {webhookPath}` takes a form-encoded event (`Body`, `From`) and answers with TwiML;
//! `GET /health` reports liveness for probes.

mod server;

pub use server::{build_app, run_gateway, GatewayState};
