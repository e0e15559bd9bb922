//! HTTP server for the pull request check bot.
//!
//! Webhook deliveries are processed inline: the response is sent once the
//! checks have run and their check runs have been posted.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries
//! - `GET /health` - Returns 200 if server is running
//! - `GET /` - Landing page
//! - `GET /installation_authorized` - GitHub App post-install page

use std::sync::Arc;

use octocrab::Octocrab;

use crate::checks::CheckRegistry;
use crate::config::Config;

pub mod health;
pub mod webhook;

pub use health::{health_handler, index_handler, installation_authorized_handler};
pub use webhook::webhook_handler;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. The check
/// registry and the global configuration are frozen before the server starts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    registry: CheckRegistry,

    /// Authenticated client; scoped per delivery.
    github: Octocrab,

    /// Prefix of every check run this bot posts.
    bot_name: String,

    global_config: Arc<Config>,

    /// Webhook secret for HMAC-SHA256 signature verification, if any.
    webhook_secret: Option<Vec<u8>>,
}

impl AppState {
    pub fn new(
        registry: CheckRegistry,
        github: Octocrab,
        bot_name: impl Into<String>,
        global_config: Config,
        webhook_secret: Option<Vec<u8>>,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                registry,
                github,
                bot_name: bot_name.into(),
                global_config: Arc::new(global_config),
                webhook_secret,
            }),
        }
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.inner.registry
    }

    pub fn github(&self) -> &Octocrab {
        &self.inner.github
    }

    pub fn bot_name(&self) -> &str {
        &self.inner.bot_name
    }

    pub fn global_config(&self) -> Arc<Config> {
        Arc::clone(&self.inner.global_config)
    }

    pub fn webhook_secret(&self) -> Option<&[u8]> {
        self.inner.webhook_secret.as_deref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/", get(index_handler))
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .route(
            "/installation_authorized",
            get(installation_authorized_handler),
        )
        .with_state(app_state)
}
