//! GitHub API error types.
//!
//! The bot never retries a failed call: the error is logged and the webhook
//! caller gets a 502, so the delivery can be redelivered from GitHub's UI.
//! Only a 404 is handled specially, by the contents API reads.

use std::fmt;
use thiserror::Error;

/// A GitHub API error.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    pub message: String,

    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates an error without an octocrab source.
    ///
    /// Used for responses that arrived but could not be interpreted.
    pub fn without_source(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an octocrab error, keeping its HTTP status if one can be found.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        Self {
            status_code: Self::extract_status_code(&err),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Returns true for HTTP 404.
    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }

    /// Extracts the HTTP status code from an octocrab error, if present.
    ///
    /// API errors carry the status directly. Other variants only mention it
    /// in their message, so fall back to matching well-known codes there.
    fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
        if let octocrab::Error::GitHub { source, .. } = err {
            return Some(source.status_code.as_u16());
        }

        status_code_from_message(&err.to_string())
    }
}

fn status_code_from_message(message: &str) -> Option<u16> {
    if let Some(idx) = message.find("status: ") {
        let rest = &message[idx + 8..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if let Ok(code) = rest[..end].parse() {
            return Some(code);
        }
    }

    let lower = message.to_lowercase();
    if message.contains("404") && lower.contains("not found") {
        return Some(404);
    }

    [422, 403, 401, 429, 500, 502, 503]
        .into_iter()
        .find(|code| message.contains(&code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_parsing() {
        assert_eq!(status_code_from_message("API rate limit exceeded, status: 403"), Some(403));
        assert_eq!(status_code_from_message("HTTP status: 502 Bad Gateway"), Some(502));
        assert_eq!(status_code_from_message("status: 404"), Some(404));
        assert_eq!(status_code_from_message("404 Not Found"), Some(404));
        assert_eq!(status_code_from_message("got 422 from API"), Some(422));
        assert_eq!(status_code_from_message("something odd"), None);
    }

    #[test]
    fn error_without_source_has_no_status() {
        let err = GitHubApiError::without_source("bad payload");
        assert_eq!(err.status_code, None);
        assert!(std::error::Error::source(&err).is_none());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "GitHub API error: bad payload");
    }

    #[test]
    fn display_includes_status_code() {
        let err = GitHubApiError {
            status_code: Some(404),
            message: "Not Found".to_string(),
            source: None,
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "GitHub API error (HTTP 404): Not Found");
    }
}
