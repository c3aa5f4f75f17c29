use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a single check. Wire values outside the four known ones are kept
/// verbatim so they can be shown without an icon or badge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Success,
    Warning,
    Danger,
    Info,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Success => "success",
            Status::Warning => "warning",
            Status::Danger => "danger",
            Status::Info => "info",
            Status::Other(raw) => raw.as_str(),
        }
    }

    pub const fn is_known(&self) -> bool {
        !matches!(self, Status::Other(_))
    }
}

/// An empty `Other`, shown without icon or badge.
impl Default for Status {
    fn default() -> Self {
        Status::Other(String::new())
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "success" => Status::Success,
            "warning" => Status::Warning,
            "danger" => Status::Danger,
            "info" => Status::Info,
            _ => Status::Other(raw),
        }
    }
}

impl From<&str> for Status {
    fn from(raw: &str) -> Self {
        Status::from(raw.to_string())
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        match status {
            Status::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
