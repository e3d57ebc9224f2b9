use geupsik_core::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),
    /// Never carries the request URL, whose query holds the API key.
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Coarse classification presented to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidQuery,
    Transport,
    MalformedResponse,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::InvalidQuery(_) => ErrorKind::InvalidQuery,
            ClientError::Http(_) | ClientError::Server { .. } => ErrorKind::Transport,
            ClientError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.without_url())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::MalformedResponse(e.to_string())
    }
}
