use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::{CheckFailure, FailureKind, ScanReport, TransportError};

/// Produces one scan outcome per URL. Implementations block until the outcome
/// is known; the caller decides which thread that happens on.
pub trait Transport {
    fn check(&self, url: &str) -> Result<ScanReport, CheckFailure>;
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    url: &'a str,
}

/// Talks to the analysis endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build the HTTP client")?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl Transport for HttpTransport {
    fn check(&self, url: &str) -> Result<ScanReport, CheckFailure> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&CheckRequest { url })
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        decode_payload(Some(status), &body)
    }
}

/// Replays a payload saved to disk. The URL passed to `check` is ignored.
#[derive(Debug, Clone)]
pub struct FileTransport {
    path: PathBuf,
    body: Vec<u8>,
}

impl FileTransport {
    pub fn open(path: &Path) -> Result<Self> {
        let body =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            body,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `url` field recorded in the payload, if it has one.
    pub fn recorded_url(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(&self.body).ok()?;
        value.get("url")?.as_str().map(str::to_string)
    }
}

impl Transport for FileTransport {
    fn check(&self, _url: &str) -> Result<ScanReport, CheckFailure> {
        decode_payload(None, &self.body)
    }
}

/// Classifies a response body. `status` is the HTTP status when there was one.
///
/// A body that decodes as a payload is trusted over the status code: its
/// `success` flag decides between a report and an application error. Only a
/// body that is not a payload falls back to the status.
pub fn decode_payload(status: Option<u16>, body: &[u8]) -> Result<ScanReport, CheckFailure> {
    match serde_json::from_slice::<ScanReport>(body) {
        Ok(report) => report.into_outcome(fallback_kind(status)),
        Err(err) => match status {
            Some(code) if !(200..300).contains(&code) => {
                Err(TransportError::Status(code).into())
            }
            _ => Err(TransportError::Malformed(err.to_string()).into()),
        },
    }
}

fn fallback_kind(status: Option<u16>) -> FailureKind {
    match status {
        Some(404 | 502 | 504) => FailureKind::Unreachable,
        _ => FailureKind::Generic,
    }
}
