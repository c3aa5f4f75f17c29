use serde::{Deserialize, Serialize};

use crate::core::Status;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, deserialize_with = "crate::core::null_as_default")]
    pub status: Status,
    #[serde(default, deserialize_with = "crate::core::null_as_default")]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub details: serde_json::Map<String, serde_json::Value>,
}

fn default_category() -> String {
    "general".to_string()
}

impl CheckResult {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        status: Status,
        score: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            status,
            score,
            max_score: None,
            message: message.into(),
            details: serde_json::Map::new(),
        }
    }
}
