use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall security level reported by the server. Anything unrecognised decodes
/// as `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Excellent,
    Good,
    Satisfactory,
    #[default]
    #[serde(other)]
    Low,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Excellent => "excellent",
            Level::Good => "good",
            Level::Satisfactory => "satisfactory",
            Level::Low => "low",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_decodes_as_low() {
        let level: Level = serde_json::from_str("\"unknown\"").expect("decode level");
        assert_eq!(level, Level::Low);
    }

    #[test]
    fn known_levels_decode() {
        let level: Level = serde_json::from_str("\"satisfactory\"").expect("decode level");
        assert_eq!(level, Level::Satisfactory);
        assert_eq!(level.to_string(), "satisfactory");
    }
}
