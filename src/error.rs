use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::TodoId;

/// Why a call to the todo backend did not produce a usable answer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Raised by console actions that need a todo the current list does not show.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("todo #{0} is not in the list")]
    UnknownTodo(TodoId),
}

// Handler error: what a route answers when it cannot render the panel.
#[derive(Debug)]
pub enum AppError {
    NotFound(anyhow::Error),
    /// The page's session is unknown or expired; htmx reloads the page.
    SessionExpired,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(err) => {
                tracing::debug!(error = %err, "not found");
                (StatusCode::NOT_FOUND, format!("Not found: {err}")).into_response()
            }
            AppError::SessionExpired => {
                tracing::debug!("unknown session, asking the page to reload");
                (
                    StatusCode::UNAUTHORIZED,
                    [("HX-Refresh", "true")],
                    "Session expired, reload the page",
                )
                    .into_response()
            }
        }
    }
}

impl From<ConsoleError> for AppError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::UnknownTodo(_) => Self::NotFound(err.into()),
        }
    }
}
