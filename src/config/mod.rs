use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/check";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub endpoint: EndpointConfig,
    pub ui: UiConfig,
    pub logs: LogsConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiConfig {
    pub color: bool,
    /// Count the score readout up instead of printing the final value at once.
    pub animate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogsConfig {
    pub enabled: bool,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig {
                url: DEFAULT_ENDPOINT.to_string(),
                timeout_secs: 30,
            },
            ui: UiConfig {
                color: true,
                animate: true,
            },
            logs: LogsConfig { enabled: true },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    endpoint: Option<RawEndpointConfig>,
    ui: Option<RawUiConfig>,
    logs: Option<RawLogsConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEndpointConfig {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUiConfig {
    color: Option<bool>,
    animate: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogsConfig {
    enabled: Option<bool>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/sitescore/config.toml")
}

/// Defaults, then the config file, then `SITESCORE_*` variables. CLI flags are
/// applied on top by the caller.
pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .or_else(|| std::env::var_os("SITESCORE_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s)
            .with_context(|| format!("failed to parse config file (TOML): {}", path.display()))?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(endpoint) = raw.endpoint {
        if let Some(url) = endpoint.url {
            cfg.endpoint.url = url;
        }
        if let Some(timeout_secs) = endpoint.timeout_secs {
            cfg.endpoint.timeout_secs = timeout_secs;
        }
    }

    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
        if let Some(animate) = ui.animate {
            cfg.ui.animate = animate;
        }
    }

    if let Some(logs) = raw.logs {
        if let Some(enabled) = logs.enabled {
            cfg.logs.enabled = enabled;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("SITESCORE_ENDPOINT_URL") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.endpoint.url = v.to_string();
        }
    }
    if let Ok(v) = std::env::var("SITESCORE_ENDPOINT_TIMEOUT_SECS") {
        cfg.endpoint.timeout_secs = v
            .trim()
            .parse::<u64>()
            .with_context(|| "SITESCORE_ENDPOINT_TIMEOUT_SECS")?;
    }
    if let Ok(v) = std::env::var("SITESCORE_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "SITESCORE_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("SITESCORE_UI_ANIMATE") {
        cfg.ui.animate = parse_bool(&v).with_context(|| "SITESCORE_UI_ANIMATE")?;
    }
    if let Ok(v) = std::env::var("SITESCORE_LOGS_ENABLED") {
        cfg.logs.enabled = parse_bool(&v).with_context(|| "SITESCORE_LOGS_ENABLED")?;
    }

    Ok(())
}

pub fn validate(cfg: &EffectiveConfig) -> Result<()> {
    let url = cfg.endpoint.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!("endpoint.url must be an http(s) URL: {url}");
    }
    if cfg.endpoint.timeout_secs == 0 {
        anyhow::bail!("endpoint.timeout_secs must be at least 1");
    }
    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}
