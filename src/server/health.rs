//! Plain-text informational endpoints.

use axum::http::StatusCode;

/// Liveness probe. Returns 200 OK with the text "OK".
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Landing page for people who open the bot's URL in a browser.
pub async fn index_handler() -> &'static str {
    "Nothing to see here"
}

/// Post-installation redirect target for the GitHub App.
pub async fn installation_authorized_handler() -> &'static str {
    "Installation authorized"
}
