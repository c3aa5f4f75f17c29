use serde::{Deserialize, Serialize};
use std::fmt;

/// Rejected before anything leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyUrl,
}

impl ValidationError {
    pub const fn user_message(self) -> &'static str {
        match self {
            ValidationError::EmptyUrl => "Please enter a site URL.",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

impl std::error::Error for ValidationError {}

/// The request never produced a usable payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Network(String),
    Status(u16),
    Malformed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(detail) => write!(f, "network error: {detail}"),
            TransportError::Status(code) => write!(f, "server answered HTTP {code}"),
            TransportError::Malformed(detail) => write!(f, "malformed response: {detail}"),
        }
    }
}

impl std::error::Error for TransportError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Unreachable,
    Generic,
}

/// The server answered with `success: false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationError {
    pub kind: FailureKind,
    pub message: Option<String>,
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message.as_deref().unwrap_or("no error message");
        match self.kind {
            FailureKind::Unreachable => write!(f, "site unreachable: {message}"),
            FailureKind::Generic => write!(f, "check failed: {message}"),
        }
    }
}

impl std::error::Error for ApplicationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    Transport(TransportError),
    Application(ApplicationError),
}

impl CheckFailure {
    /// The single sentence shown in the error panel.
    pub fn user_message(&self) -> String {
        match self {
            CheckFailure::Application(ApplicationError {
                kind: FailureKind::Unreachable,
                message,
            }) => format!(
                "Site unavailable: {}. Check the URL and make sure the site is reachable.",
                message.as_deref().unwrap_or("the page does not exist")
            ),
            CheckFailure::Application(ApplicationError {
                kind: FailureKind::Generic,
                message,
            }) => message
                .clone()
                .unwrap_or_else(|| "The site check failed.".to_string()),
            CheckFailure::Transport(err) => {
                format!("Could not reach the analysis server: {err}")
            }
        }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckFailure::Transport(err) => err.fmt(f),
            CheckFailure::Application(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CheckFailure {}

impl From<TransportError> for CheckFailure {
    fn from(err: TransportError) -> Self {
        CheckFailure::Transport(err)
    }
}

impl From<ApplicationError> for CheckFailure {
    fn from(err: ApplicationError) -> Self {
        CheckFailure::Application(err)
    }
}
