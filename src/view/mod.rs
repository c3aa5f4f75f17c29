//! The rendering surface the controller draws on.
//!
//! Every mount point has a stable identifier. A [`View`] exposes one method per
//! render step; a step that needs a mount point the view does not have fails
//! with [`MountError::Missing`] and leaves the rest of the render untouched.

mod scene;

use std::fmt;

use crate::core::Status;
use crate::visual::{LevelText, Rgb, ScoreColor};

pub use scene::{BoundChart, RingState, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MountId {
    UrlInput,
    SubmitControl,
    SubmitLabel,
    SubmitSpinner,
    ResultsPanel,
    ErrorPanel,
    ErrorMessage,
    ScoreReadout,
    ScoreRing,
    ScoreBadge,
    LevelTitle,
    LevelDescription,
    CheckedAt,
    CategoryChart,
    StatusChart,
    ChecksContainer,
    RecommendationsPanel,
    RecommendationsList,
}

impl MountId {
    pub const ALL: [MountId; 18] = [
        MountId::UrlInput,
        MountId::SubmitControl,
        MountId::SubmitLabel,
        MountId::SubmitSpinner,
        MountId::ResultsPanel,
        MountId::ErrorPanel,
        MountId::ErrorMessage,
        MountId::ScoreReadout,
        MountId::ScoreRing,
        MountId::ScoreBadge,
        MountId::LevelTitle,
        MountId::LevelDescription,
        MountId::CheckedAt,
        MountId::CategoryChart,
        MountId::StatusChart,
        MountId::ChecksContainer,
        MountId::RecommendationsPanel,
        MountId::RecommendationsList,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            MountId::UrlInput => "urlInput",
            MountId::SubmitControl => "checkButton",
            MountId::SubmitLabel => "checkButtonLabel",
            MountId::SubmitSpinner => "checkButtonSpinner",
            MountId::ResultsPanel => "resultsContainer",
            MountId::ErrorPanel => "errorContainer",
            MountId::ErrorMessage => "errorMessage",
            MountId::ScoreReadout => "scoreValue",
            MountId::ScoreRing => "scoreRing",
            MountId::ScoreBadge => "scoreCircle",
            MountId::LevelTitle => "levelText",
            MountId::LevelDescription => "levelDescription",
            MountId::CheckedAt => "checkTime",
            MountId::CategoryChart => "categoryChart",
            MountId::StatusChart => "statusChart",
            MountId::ChecksContainer => "checksAccordion",
            MountId::RecommendationsPanel => "recommendationsCard",
            MountId::RecommendationsList => "recommendationsList",
        }
    }
}

impl fmt::Display for MountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSurface {
    Category,
    Status,
}

impl ChartSurface {
    pub const fn mount(self) -> MountId {
        match self {
            ChartSurface::Category => MountId::CategoryChart,
            ChartSurface::Status => MountId::StatusChart,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    Missing(MountId),
    SurfaceBusy(ChartSurface),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountError::Missing(id) => write!(f, "mount point `{id}` is missing"),
            MountError::SurfaceBusy(surface) => write!(
                f,
                "chart surface `{}` already holds a chart",
                surface.mount()
            ),
        }
    }
}

impl std::error::Error for MountError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartKind {
    /// Vertical bars on a fixed `0..=max` axis.
    Bar { max: f64 },
    Doughnut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

/// Proof that a chart is bound to a surface. Only one exists per surface, and
/// giving it back to [`View::dispose_chart`] is the only way to free the surface.
#[derive(Debug, PartialEq, Eq)]
pub struct ChartHandle {
    surface: ChartSurface,
    id: u64,
}

impl ChartHandle {
    pub fn new(surface: ChartSurface, id: u64) -> Self {
        Self { surface, id }
    }

    pub fn surface(&self) -> ChartSurface {
        self.surface
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckItem {
    pub name: String,
    pub message: String,
    pub status: Status,
    pub icon: Option<&'static str>,
    pub badge: Option<&'static str>,
    pub annotation: Option<String>,
}

/// One collapsible section of the checks list.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSection {
    pub category: String,
    pub title: String,
    pub expanded: bool,
    pub items: Vec<CheckItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationItem {
    pub text: String,
    pub critical: bool,
}

pub trait View {
    /// Disables the submit control and swaps its label for the spinner, or back.
    fn set_busy(&mut self, busy: bool) -> Result<(), MountError>;
    /// Hides the results and error panels.
    fn clear_panels(&mut self) -> Result<(), MountError>;
    fn set_score_readout(&mut self, value: u32) -> Result<(), MountError>;
    fn set_ring(&mut self, offset: f64, color: Rgb) -> Result<(), MountError>;
    fn set_badge(&mut self, color: ScoreColor) -> Result<(), MountError>;
    fn set_level(&mut self, text: LevelText) -> Result<(), MountError>;
    fn set_checked_at(&mut self, text: Option<String>) -> Result<(), MountError>;
    fn bind_chart(
        &mut self,
        surface: ChartSurface,
        spec: ChartSpec,
    ) -> Result<ChartHandle, MountError>;
    fn dispose_chart(&mut self, handle: ChartHandle);
    fn render_checks(&mut self, sections: Vec<CheckSection>) -> Result<(), MountError>;
    /// An empty list hides the whole recommendations panel.
    fn render_recommendations(&mut self, items: Vec<RecommendationItem>)
    -> Result<(), MountError>;
    /// Reveals the results panel, hides the error panel and brings the
    /// results into view.
    fn show_results(&mut self) -> Result<(), MountError>;
    /// Writes the single error message and brings the error panel into view.
    fn show_error(&mut self, message: &str) -> Result<(), MountError>;
}
