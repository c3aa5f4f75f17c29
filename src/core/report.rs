use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::core::{ApplicationError, CheckFailure, CheckResult, FailureKind, Level};

/// One scan as returned by the analysis endpoint. `success` decides whether the
/// score half or the `error` half of the payload is meaningful.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(default, deserialize_with = "crate::core::null_as_default")]
    pub percentage: f64,
    #[serde(default, deserialize_with = "crate::core::null_as_default")]
    pub level: Level,
    #[serde(default)]
    pub categories: LinkedHashMap<String, f64>,
    #[serde(default)]
    pub checks: Vec<CheckResult>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

impl ScanReport {
    /// Splits a decoded payload on its `success` flag. `fallback_kind` is used
    /// when the server did not classify the failure itself.
    pub fn into_outcome(self, fallback_kind: FailureKind) -> Result<ScanReport, CheckFailure> {
        if self.success {
            return Ok(self);
        }
        Err(CheckFailure::Application(ApplicationError {
            kind: self.error_kind.unwrap_or(fallback_kind),
            message: self.error.filter(|e| !e.trim().is_empty()),
        }))
    }
}

/// Renders a payload timestamp as `YYYY-MM-DD HH:MM:SS`. The server sends ISO
/// 8601 without an offset; RFC 3339 is accepted as well. Anything else is
/// returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    let display = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let raw = raw.trim();

    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        if let Ok(s) = ts.format(display) {
            return s;
        }
    }

    let naive = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    if let Ok(ts) = PrimitiveDateTime::parse(raw, naive) {
        if let Ok(s) = ts.format(display) {
            return s;
        }
    }

    raw.to_string()
}
