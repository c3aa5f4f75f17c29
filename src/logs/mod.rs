use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::{CheckFailure, Level};
use crate::view::MountError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckLogStatus {
    Ok,
    Stale,
    ApplicationError,
    TransportError,
}

/// Everything one `check`/`render` run records about itself.
#[derive(Debug, Clone)]
pub struct CheckRun<'a> {
    pub command: &'static str,
    pub url: &'a str,
    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
    pub status: CheckLogStatus,
    pub percentage: Option<f64>,
    pub level: Option<Level>,
    pub failure: Option<&'a CheckFailure>,
    pub render_errors: &'a [MountError],
}

#[derive(Debug, Serialize)]
struct CheckLog {
    schema_version: &'static str,
    tool_version: String,
    command: &'static str,
    url: String,
    started_at: String,
    finished_at: String,
    status: CheckLogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<FailureLog>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    render_errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct FailureLog {
    detail: String,
    message: String,
}

impl CheckLogStatus {
    pub fn from_failure(failure: &CheckFailure) -> Self {
        match failure {
            CheckFailure::Transport(_) => CheckLogStatus::TransportError,
            CheckFailure::Application(_) => CheckLogStatus::ApplicationError,
        }
    }
}

pub fn logs_dir(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/sitescore/logs")
}

pub fn write_check_log(home_dir: &Path, run: &CheckRun<'_>) -> Result<PathBuf> {
    let dir = logs_dir(home_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let pid = std::process::id();
    let ts = run.finished_at.unix_timestamp_nanos();
    let path = dir.join(format!("check-{pid}-{ts}.json"));

    let log = CheckLog {
        schema_version: "1.0",
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        command: run.command,
        url: run.url.to_string(),
        started_at: run
            .started_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string()),
        finished_at: run
            .finished_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string()),
        status: run.status,
        percentage: run.percentage,
        level: run.level,
        failure: run.failure.map(|f| FailureLog {
            detail: f.to_string(),
            message: f.user_message(),
        }),
        render_errors: run.render_errors.iter().map(ToString::to_string).collect(),
    };

    let buf = serde_json::to_vec_pretty(&log).context("failed to serialize log (JSON)")?;
    std::fs::write(&path, buf)
        .with_context(|| format!("failed to write log: {}", path.display()))?;
    Ok(path)
}
