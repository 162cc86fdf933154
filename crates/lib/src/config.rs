//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.newsrelay/config.json`) and environment.
//! Secrets (messaging auth token, generative API key) may come from env instead of the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Messaging platform (Twilio) credentials and template ids.
    #[serde(default)]
    pub messaging: MessagingConfig,

    /// Generative-text backend (Gemini).
    #[serde(default)]
    pub generative: GenerativeConfig,

    /// Analytics backend (user registry, interaction log, digests).
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Session lifecycle.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Gateway bind, port and webhook route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 9000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,

    /// Route the messaging platform POSTs inbound events to (default "/").
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// When true, a backend failure while handling an event is returned as HTTP 500
    /// instead of an apology reply.
    #[serde(default)]
    pub fail_on_backend_error: bool,
}

fn default_gateway_port() -> u16 {
    9000
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_path() -> String {
    "/".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
            webhook_path: default_webhook_path(),
            fail_on_backend_error: false,
        }
    }
}

/// Twilio account, sender address and pre-registered content templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingConfig {
    pub account_sid: Option<String>,
    /// Overridden by TWILIO_AUTH_TOKEN env when set.
    pub auth_token: Option<String>,
    /// Sender address used for outbound messages (e.g. "whatsapp:+14155238886").
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_messaging_api_base")]
    pub api_base: String,
    /// Template sent on first contact (asks the user for their name).
    pub intro_template_sid: Option<String>,
    /// Template listing the analysis options, sent after a link is received.
    pub options_template_sid: Option<String>,
}

fn default_from_address() -> String {
    "whatsapp:+14155238886".to_string()
}

fn default_messaging_api_base() -> String {
    "https://api.twilio.com".to_string()
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from_address: default_from_address(),
            api_base: default_messaging_api_base(),
            intro_template_sid: None,
            options_template_sid: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerativeConfig {
    /// Overridden by GEMINI_API_KEY env when set.
    pub api_key: Option<String>,
    #[serde(default = "default_generative_model")]
    pub model: String,
    #[serde(default = "default_generative_base_url")]
    pub base_url: String,
}

fn default_generative_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_generative_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_generative_model(),
            base_url: default_generative_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_base_url")]
    pub base_url: String,
    /// When false, no analytics calls are made (registration is local only, digest actions fail).
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_analytics_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: default_analytics_base_url(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Drop sessions idle for longer than this many seconds. Unset keeps them for the process lifetime.
    pub idle_ttl_secs: Option<u64>,
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

fn default_prune_interval_secs() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: None,
            prune_interval_secs: default_prune_interval_secs(),
        }
    }
}

/// Env value wins over the config value; blank strings count as unset.
fn env_or_config(env_key: &str, configured: Option<&String>) -> Option<String> {
    std::env::var(env_key)
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            configured
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the Twilio auth token: env TWILIO_AUTH_TOKEN overrides config.
pub fn resolve_auth_token(config: &Config) -> Option<String> {
    env_or_config("TWILIO_AUTH_TOKEN", config.messaging.auth_token.as_ref())
}

/// Resolve the Gemini API key: env GEMINI_API_KEY overrides config.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    env_or_config("GEMINI_API_KEY", config.generative.api_key.as_ref())
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("NEWSRELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".newsrelay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (or NEWSRELAY_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
