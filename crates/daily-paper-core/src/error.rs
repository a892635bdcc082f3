use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Failed to parse config {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API returned HTTP {status}{}: {message}", .code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Api {
        status: u16,
        /// OpenAI error `code`, falling back to its `type`
        code: Option<String>,
        message: String,
    },

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Model {0} returned no completion")]
    EmptyCompletion(String),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether resubmitting the same request could plausibly succeed.
    ///
    /// Timeouts, connection failures, HTTP 429 and 5xx responses are transient.
    /// Everything else (bad credentials, malformed requests, config problems)
    /// is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            // A 429 for an exhausted quota will not clear up by waiting
            Error::Api { status: 429, code, .. } => code.as_deref() != Some("insufficient_quota"),
            Error::Api { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
