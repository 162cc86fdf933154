//! Gateway HTTP server (webhook + health).

use crate::analytics::{Analytics, DisabledAnalytics, HttpAnalytics};
use crate::channels::{InboundEvent, Messenger, TwilioMessenger};
use crate::config::{self, Config};
use crate::error::RelayError;
use crate::llm::{GeminiClient, TextGenerator};
use crate::router::{ConversationRouter, ConversationTemplates};
use crate::session::SessionStore;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;

const APOLOGY: &str = "Sorry, something went wrong while processing your message. Please try again later.";

/// Shared state for the gateway (config and the conversation router).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub router: Arc<ConversationRouter>,
}

impl GatewayState {
    /// Wire the router to the HTTP clients described by `config`.
    pub fn from_config(config: Config) -> Self {
        let messenger: Arc<dyn Messenger> = Arc::new(TwilioMessenger::new(
            Some(config.messaging.api_base.clone()),
            config.messaging.account_sid.clone(),
            config::resolve_auth_token(&config),
            config.messaging.from_address.clone(),
        ));
        let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(
            Some(config.generative.base_url.clone()),
            Some(config.generative.model.clone()),
            config::resolve_api_key(&config),
        ));
        let analytics: Arc<dyn Analytics> = if config.analytics.enabled {
            Arc::new(HttpAnalytics::new(&config.analytics.base_url))
        } else {
            Arc::new(DisabledAnalytics)
        };
        let templates = ConversationTemplates {
            intro: config.messaging.intro_template_sid.clone(),
            options: config.messaging.options_template_sid.clone(),
        };
        let router = ConversationRouter::new(
            Arc::new(SessionStore::new()),
            messenger,
            generator,
            analytics,
            templates,
        );
        Self {
            config: Arc::new(config),
            router: Arc::new(router),
        }
    }
}

/// Form fields posted by the messaging platform. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct WebhookForm {
    #[serde(rename = "Body")]
    body: Option<String>,
    #[serde(rename = "From")]
    from: Option<String>,
}

fn webhook_route(path: &str) -> String {
    let p = path.trim();
    if p.starts_with('/') {
        p.to_string()
    } else {
        format!("/{}", p)
    }
}

/// Build the HTTP app for the given state.
pub fn build_app(state: GatewayState) -> Router {
    let path = webhook_route(&state.config.gateway.webhook_path);
    Router::new()
        .route("/health", get(health_http))
        .route(&path, post(inbound_webhook))
        .with_state(state)
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let bind = config.gateway.bind.trim().to_string();
    if !config::is_loopback_bind(&bind) {
        log::warn!("gateway binding to non-loopback address {}; webhook is reachable from the network", bind);
    }
    if config.messaging.account_sid.is_none() || config::resolve_auth_token(&config).is_none() {
        log::warn!("messaging credentials not configured; outbound sends will fail");
    }
    if config::resolve_api_key(&config).is_none() {
        log::warn!("generative api key not configured; analysis actions will fail");
    }

    let port = config.gateway.port;
    let state = GatewayState::from_config(config);
    let prune_task = spawn_session_pruning(&state);
    let app = build_app(state);

    let bind_addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(prune_task))
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Periodically drop idle sessions when `session.idleTtlSecs` is set.
fn spawn_session_pruning(state: &GatewayState) -> Option<JoinHandle<()>> {
    let ttl_secs = state.config.session.idle_ttl_secs?;
    let ttl = chrono::Duration::seconds(ttl_secs.min(i64::MAX as u64 / 1000) as i64);
    let every = std::time::Duration::from_secs(state.config.session.prune_interval_secs.max(1));
    let sessions = state.router.sessions().clone();
    log::info!("session pruning enabled: idle ttl {}s, every {}s", ttl_secs, every.as_secs());
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = sessions.prune_idle(ttl).await;
            if removed > 0 {
                log::debug!("pruned {} idle session(s)", removed);
            }
        }
    }))
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal(prune_task: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
    if let Some(task) = prune_task {
        task.abort();
    }
}

fn twiml_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/xml")], body).into_response()
}

/// POST {webhookPath} — one inbound message; replies with a TwiML envelope.
async fn inbound_webhook(
    State(state): State<GatewayState>,
    Form(form): Form<WebhookForm>,
) -> Response {
    let Some(sender) = form.from.filter(|f| !f.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing From").into_response();
    };
    let event = InboundEvent::new(form.body.unwrap_or_default(), sender);
    let request_id = uuid::Uuid::new_v4();
    log::info!("webhook[{}]: message from {}: {:?}", request_id, event.sender, event.body);

    match state.router.handle(&event).await {
        Ok(reply) => twiml_response(StatusCode::OK, reply.to_twiml()),
        Err(e) => backend_failure(&state, request_id, e),
    }
}

fn backend_failure(state: &GatewayState, request_id: uuid::Uuid, e: RelayError) -> Response {
    log::error!("webhook[{}]: {}", request_id, e);
    if state.config.gateway.fail_on_backend_error {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    twiml_response(
        StatusCode::OK,
        crate::channels::twiml::message_response(Some(APOLOGY)),
    )
}

/// GET /health returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "sessions": state.router.sessions().len().await,
    }))
}
