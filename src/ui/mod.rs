use anyhow::Error;
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

use crate::core::Status;
use crate::view::{BoundChart, ChartKind, CheckSection, RecommendationItem, Scene};
use crate::visual::{Rgb, ring_fraction};
use crate::visual::labels::status_color;

const RING_CELLS: usize = 40;
const BAR_CELLS: usize = 20;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "error:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "caused by:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "next:");
    let _ = writeln!(stderr, "  - re-run with `--verbose` for details");
    let _ = writeln!(
        stderr,
        "  - see `sitescore --help` for the available commands and options"
    );
}

pub fn print_scene(scene: &Scene, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = out.write_all(render_scene(scene, cfg.color).as_bytes());
}

/// Writes the count-up value in place on the current line.
pub fn print_readout_frame(value: u32) {
    let mut out = io::stdout().lock();
    let _ = write!(out, "\rScore: {value}%");
    let _ = out.flush();
}

pub fn clear_readout_line() {
    let mut out = io::stdout().lock();
    let _ = write!(out, "\r\x1b[2K");
    let _ = out.flush();
}

/// Text rendering of the results panel. An empty string when no results are
/// visible.
pub fn render_scene(scene: &Scene, color: bool) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    if !scene.results_visible {
        return out;
    }

    if let Some(value) = scene.score_readout {
        let _ = write!(out, "Score: {value}%");
        if let Some(ring) = scene.ring {
            let filled = cells(ring_fraction(f64::from(value)), RING_CELLS);
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(RING_CELLS - filled));
            let _ = write!(out, "  {}", paint(&bar, ring.color, color));
        }
        let _ = writeln!(out);
    }
    if let Some(badge) = scene.badge {
        let _ = writeln!(
            out,
            "Badge: {} -> {}",
            badge.badge_start.to_hex(),
            badge.badge_end.to_hex()
        );
    }
    if let Some(level) = scene.level {
        let _ = writeln!(out, "{}", level.title);
        let _ = writeln!(out, "  {}", level.description);
    }
    if let Some(checked_at) = &scene.checked_at {
        let _ = writeln!(out, "Checked at: {checked_at}");
    }

    if let Some(chart) = &scene.category_chart {
        let _ = writeln!(out);
        let _ = writeln!(out, "Categories:");
        write_chart(&mut out, chart, color);
    }
    if let Some(chart) = &scene.status_chart {
        let _ = writeln!(out);
        let _ = writeln!(out, "Check status:");
        write_chart(&mut out, chart, color);
    }

    for section in &scene.check_sections {
        let _ = writeln!(out);
        write_section(&mut out, section, color);
    }

    if scene.recommendations_visible {
        let _ = writeln!(out);
        let _ = writeln!(out, "Recommendations:");
        for item in &scene.recommendations {
            write_recommendation(&mut out, item, color);
        }
    }

    out
}

fn write_chart(out: &mut String, chart: &BoundChart, color: bool) {
    use std::fmt::Write as _;

    let label_w = chart
        .spec
        .points
        .iter()
        .map(|p| visible_width_ansi(&p.label))
        .max()
        .unwrap_or(0);

    match chart.spec.kind {
        ChartKind::Bar { max } => {
            for point in &chart.spec.points {
                let fraction = if max > 0.0 { point.value / max } else { 0.0 };
                let filled = cells(fraction, BAR_CELLS);
                let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled));
                let _ = writeln!(
                    out,
                    "  {}  {}  {:.0}",
                    pad_end_display(&point.label, label_w),
                    paint(&bar, point.color, color),
                    point.value
                );
            }
        }
        ChartKind::Doughnut => {
            let total: f64 = chart.spec.points.iter().map(|p| p.value).sum();
            for point in &chart.spec.points {
                let share = if total > 0.0 {
                    point.value / total * 100.0
                } else {
                    0.0
                };
                let _ = writeln!(
                    out,
                    "  {} {}  {:>3}  ({share:.0}%)",
                    paint("●", point.color, color),
                    pad_end_display(&point.label, label_w),
                    point.value
                );
            }
        }
    }
}

fn write_section(out: &mut String, section: &CheckSection, color: bool) {
    use std::fmt::Write as _;

    if !section.expanded {
        let _ = writeln!(out, "▸ {} ({} checks)", section.title, section.items.len());
        return;
    }
    let _ = writeln!(out, "▾ {}", section.title);
    for item in &section.items {
        let icon = item.icon.unwrap_or("•");
        let badge = match item.badge {
            Some(label) => {
                let text = format!("[{label}]");
                match status_color(&item.status) {
                    Some(rgb) => paint(&text, rgb, color),
                    None => text,
                }
            }
            None => format!("[{}]", item.status),
        };
        let _ = write!(out, "  {icon} {}  {badge}", item.name);
        if let Some(annotation) = &item.annotation {
            let _ = write!(out, "  {annotation}");
        }
        let _ = writeln!(out);
        if !item.message.is_empty() {
            let _ = writeln!(out, "      {}", item.message);
        }
    }
}

fn write_recommendation(out: &mut String, item: &RecommendationItem, color: bool) {
    use std::fmt::Write as _;

    if item.critical {
        let text = format!("! {}", item.text);
        let painted = match status_color(&Status::Danger) {
            Some(rgb) if color => format!("\x1b[1m{}", paint(&text, rgb, true)),
            _ => text,
        };
        let _ = writeln!(out, "  {painted}");
    } else {
        let _ = writeln!(out, "  - {}", item.text);
    }
}

fn cells(fraction: f64, width: usize) -> usize {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    (fraction * width as f64).round() as usize
}

fn paint(s: &str, rgb: Rgb, color: bool) -> String {
    if !color {
        return s.to_string();
    }
    format!("\x1b[38;2;{};{};{}m{s}\x1b[0m", rgb.r, rgb.g, rgb.b)
}

fn pad_end_display(s: &str, width: usize) -> String {
    let w = visible_width_ansi(s);
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}

fn visible_width_ansi(s: &str) -> usize {
    let mut width: usize = 0;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            let _ = chars.next();
            for ch2 in chars.by_ref() {
                if ch2 == 'm' {
                    break;
                }
            }
            continue;
        }
        width = width.saturating_add(UnicodeWidthChar::width(ch).unwrap_or(0));
    }
    width
}
