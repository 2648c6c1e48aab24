use thiserror::Error;

use crate::authz::Redirect;

#[derive(Error, Debug)]
pub enum InkpostError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// A guarded view was opened while signed out.
    #[error("Not signed in, redirecting to {}", .0.location())]
    LoginRequired(Redirect),

    /// A guarded view was opened by a role it does not admit.
    #[error("{} is not available to your role, redirecting to {}", .path, .redirect.location())]
    RouteForbidden { path: String, redirect: Redirect },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to update reaction. Please try again.")]
    ReactionFailed,

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, InkpostError>;
