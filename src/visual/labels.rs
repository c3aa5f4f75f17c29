use crate::core::{Level, Status};
use crate::visual::Rgb;

/// Markers that flag a recommendation as critical.
pub const CRITICAL_MARKERS: [&str; 2] = ["🚨", "CRITICAL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelText {
    pub title: &'static str,
    pub description: &'static str,
}

pub fn level_text(level: Level) -> LevelText {
    match level {
        Level::Excellent => LevelText {
            title: "🟢 Excellent security level",
            description: "Your site is well protected. All the main security settings are configured correctly.",
        },
        Level::Good => LevelText {
            title: "🟡 Good security level",
            description: "Good security overall. A few points could still be improved.",
        },
        Level::Satisfactory => LevelText {
            title: "🟠 Satisfactory security level",
            description: "Satisfactory. Several security aspects should be improved.",
        },
        Level::Low => LevelText {
            title: "🔴 Low security level",
            description: "Low security. The protective settings need urgent attention.",
        },
    }
}

/// Section heading for a group of checks.
pub fn category_title(tag: &str) -> &str {
    match tag {
        "connection" => "Connection & SSL",
        "headers" => "Security headers",
        "cookies" => "Cookie security",
        "server" => "Server information",
        "content" => "Content & performance",
        "general" => "General checks",
        other => other,
    }
}

/// Axis label on the category chart.
pub fn category_short(tag: &str) -> &str {
    match tag {
        "connection" => "Connection",
        "headers" => "Headers",
        "cookies" => "Cookies",
        "server" => "Server",
        "content" => "Content",
        other => other,
    }
}

pub fn status_icon(status: &Status) -> Option<&'static str> {
    match status {
        Status::Success => Some("✔"),
        Status::Warning => Some("⚠"),
        Status::Danger => Some("✖"),
        Status::Info => Some("ℹ"),
        Status::Other(_) => None,
    }
}

pub fn status_label(status: &Status) -> Option<&'static str> {
    match status {
        Status::Success => Some("Passed"),
        Status::Warning => Some("Warning"),
        Status::Danger => Some("Danger"),
        Status::Info => Some("Info"),
        Status::Other(_) => None,
    }
}

pub fn status_color(status: &Status) -> Option<Rgb> {
    match status {
        Status::Success => Some(Rgb::new(25, 135, 84)),
        Status::Warning => Some(Rgb::new(255, 193, 7)),
        Status::Danger => Some(Rgb::new(220, 53, 69)),
        Status::Info => Some(Rgb::new(13, 202, 240)),
        Status::Other(_) => None,
    }
}

const CATEGORY_PALETTE: [Rgb; 5] = [
    Rgb::new(25, 135, 84),
    Rgb::new(13, 110, 253),
    Rgb::new(255, 193, 7),
    Rgb::new(220, 53, 69),
    Rgb::new(13, 202, 240),
];

/// Bar colour for the `index`-th category; the palette repeats.
pub fn category_color(index: usize) -> Rgb {
    CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]
}

pub fn score_annotation(score: f64) -> Option<String> {
    (score > 0.0).then(|| format!("+{score:.1}"))
}

pub fn is_critical(recommendation: &str) -> bool {
    CRITICAL_MARKERS.iter().any(|m| recommendation.contains(m))
}
