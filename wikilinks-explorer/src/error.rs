use std::{io, net::SocketAddr};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use wikilinks_core::LinkGraphError;

/// Errors raised while serving the explorer.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// No article carries the requested name.
    #[error("no article named '{name}'")]
    NotFound {
        /// Requested name.
        name: String,
    },
    /// The `name` query parameter was missing or blank.
    #[error("the 'name' query parameter is required")]
    MissingName,
    /// The link graph failed.
    #[error(transparent)]
    Graph(#[from] LinkGraphError),
    /// A blocking graph query was cancelled or panicked.
    #[error("graph query task failed: {source}")]
    Join {
        /// Task failure.
        #[source]
        source: tokio::task::JoinError,
    },
    /// A page template failed to render.
    #[error("failed to render page: {source}")]
    Render {
        /// Template failure.
        #[source]
        source: askama::Error,
    },
    /// The listener could not be bound.
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The server stopped with an error.
    #[error("explorer server failed: {source}")]
    Serve {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl ExplorerError {
    /// HTTP status reported for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MissingName => StatusCode::BAD_REQUEST,
            Self::Graph(_)
            | Self::Join { .. }
            | Self::Render { .. }
            | Self::Bind { .. }
            | Self::Serve { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExplorerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}
