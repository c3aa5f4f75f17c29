use std::collections::BTreeSet;

use crate::visual::{LevelText, Rgb, ScoreColor};

use super::{
    ChartHandle, ChartSpec, ChartSurface, CheckSection, MountError, MountId, RecommendationItem,
    View,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingState {
    pub offset: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundChart {
    pub id: u64,
    pub spec: ChartSpec,
}

/// In-memory view: the state of every mount point, drawn by the text printer
/// and by the terminal UI.
#[derive(Debug, Clone)]
pub struct Scene {
    mounts: BTreeSet<MountId>,
    next_chart_id: u64,
    pub url_input: String,
    pub submit_enabled: bool,
    pub spinner_visible: bool,
    pub results_visible: bool,
    pub error_visible: bool,
    pub error_message: Option<String>,
    pub score_readout: Option<u32>,
    pub ring: Option<RingState>,
    pub badge: Option<ScoreColor>,
    pub level: Option<LevelText>,
    pub checked_at: Option<String>,
    pub category_chart: Option<BoundChart>,
    pub status_chart: Option<BoundChart>,
    pub disposed_charts: usize,
    pub check_sections: Vec<CheckSection>,
    pub recommendations_visible: bool,
    pub recommendations: Vec<RecommendationItem>,
    /// Panel most recently brought into view.
    pub focused_panel: Option<MountId>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::with_mounts(MountId::ALL.iter().copied().collect())
    }

    /// A scene lacking the given mount points.
    pub fn without(missing: &[MountId]) -> Self {
        Self::with_mounts(
            MountId::ALL
                .iter()
                .copied()
                .filter(|id| !missing.contains(id))
                .collect(),
        )
    }

    fn with_mounts(mounts: BTreeSet<MountId>) -> Self {
        Self {
            mounts,
            next_chart_id: 1,
            url_input: String::new(),
            submit_enabled: true,
            spinner_visible: false,
            results_visible: false,
            error_visible: false,
            error_message: None,
            score_readout: None,
            ring: None,
            badge: None,
            level: None,
            checked_at: None,
            category_chart: None,
            status_chart: None,
            disposed_charts: 0,
            check_sections: Vec::new(),
            recommendations_visible: false,
            recommendations: Vec::new(),
            focused_panel: None,
        }
    }

    pub fn chart(&self, surface: ChartSurface) -> Option<&BoundChart> {
        match surface {
            ChartSurface::Category => self.category_chart.as_ref(),
            ChartSurface::Status => self.status_chart.as_ref(),
        }
    }

    fn chart_slot(&mut self, surface: ChartSurface) -> &mut Option<BoundChart> {
        match surface {
            ChartSurface::Category => &mut self.category_chart,
            ChartSurface::Status => &mut self.status_chart,
        }
    }

    fn require(&self, ids: &[MountId]) -> Result<(), MountError> {
        match ids.iter().find(|id| !self.mounts.contains(id)) {
            Some(id) => Err(MountError::Missing(*id)),
            None => Ok(()),
        }
    }
}

impl View for Scene {
    fn set_busy(&mut self, busy: bool) -> Result<(), MountError> {
        self.require(&[
            MountId::SubmitControl,
            MountId::SubmitLabel,
            MountId::SubmitSpinner,
        ])?;
        self.submit_enabled = !busy;
        self.spinner_visible = busy;
        Ok(())
    }

    fn clear_panels(&mut self) -> Result<(), MountError> {
        self.require(&[MountId::ResultsPanel, MountId::ErrorPanel])?;
        self.results_visible = false;
        self.error_visible = false;
        self.focused_panel = None;
        Ok(())
    }

    fn set_score_readout(&mut self, value: u32) -> Result<(), MountError> {
        self.require(&[MountId::ScoreReadout])?;
        self.score_readout = Some(value);
        Ok(())
    }

    fn set_ring(&mut self, offset: f64, color: Rgb) -> Result<(), MountError> {
        self.require(&[MountId::ScoreRing])?;
        self.ring = Some(RingState { offset, color });
        Ok(())
    }

    fn set_badge(&mut self, color: ScoreColor) -> Result<(), MountError> {
        self.require(&[MountId::ScoreBadge])?;
        self.badge = Some(color);
        Ok(())
    }

    fn set_level(&mut self, text: LevelText) -> Result<(), MountError> {
        self.require(&[MountId::LevelTitle, MountId::LevelDescription])?;
        self.level = Some(text);
        Ok(())
    }

    fn set_checked_at(&mut self, text: Option<String>) -> Result<(), MountError> {
        self.require(&[MountId::CheckedAt])?;
        self.checked_at = text;
        Ok(())
    }

    fn bind_chart(
        &mut self,
        surface: ChartSurface,
        spec: ChartSpec,
    ) -> Result<ChartHandle, MountError> {
        self.require(&[surface.mount()])?;
        let id = self.next_chart_id;
        let slot = self.chart_slot(surface);
        if slot.is_some() {
            return Err(MountError::SurfaceBusy(surface));
        }
        *slot = Some(BoundChart { id, spec });
        self.next_chart_id += 1;
        Ok(ChartHandle::new(surface, id))
    }

    fn dispose_chart(&mut self, handle: ChartHandle) {
        let slot = self.chart_slot(handle.surface());
        if slot.as_ref().is_some_and(|c| c.id == handle.id()) {
            *slot = None;
            self.disposed_charts += 1;
        }
    }

    fn render_checks(&mut self, sections: Vec<CheckSection>) -> Result<(), MountError> {
        self.require(&[MountId::ChecksContainer])?;
        self.check_sections = sections;
        Ok(())
    }

    fn render_recommendations(
        &mut self,
        items: Vec<RecommendationItem>,
    ) -> Result<(), MountError> {
        self.require(&[MountId::RecommendationsPanel])?;
        if items.is_empty() {
            self.recommendations_visible = false;
            self.recommendations.clear();
            return Ok(());
        }
        self.require(&[MountId::RecommendationsList])?;
        self.recommendations_visible = true;
        self.recommendations = items;
        Ok(())
    }

    fn show_results(&mut self) -> Result<(), MountError> {
        self.require(&[MountId::ResultsPanel])?;
        self.results_visible = true;
        self.error_visible = false;
        self.error_message = None;
        self.focused_panel = Some(MountId::ResultsPanel);
        Ok(())
    }

    fn show_error(&mut self, message: &str) -> Result<(), MountError> {
        self.require(&[MountId::ErrorPanel, MountId::ErrorMessage])?;
        self.error_message = Some(message.to_string());
        self.error_visible = true;
        self.focused_panel = Some(MountId::ErrorPanel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ChartKind, ChartPoint};

    fn spec() -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Doughnut,
            points: vec![ChartPoint {
                label: "Passed".to_string(),
                value: 1.0,
                color: Rgb::new(0, 0, 0),
            }],
        }
    }

    #[test]
    fn surface_accepts_one_chart_at_a_time() {
        let mut scene = Scene::new();
        let first = scene
            .bind_chart(ChartSurface::Status, spec())
            .expect("bind first");
        assert_eq!(
            scene.bind_chart(ChartSurface::Status, spec()),
            Err(MountError::SurfaceBusy(ChartSurface::Status))
        );
        scene.dispose_chart(first);
        assert!(scene.chart(ChartSurface::Status).is_none());
        let second = scene
            .bind_chart(ChartSurface::Status, spec())
            .expect("bind second");
        assert_eq!(second.id(), 2);
        assert_eq!(scene.disposed_charts, 1);
    }

    #[test]
    fn missing_mount_fails_only_that_step() {
        let mut scene = Scene::without(&[MountId::ScoreRing]);
        assert_eq!(
            scene.set_ring(0.0, Rgb::new(1, 2, 3)),
            Err(MountError::Missing(MountId::ScoreRing))
        );
        assert!(scene.set_score_readout(7).is_ok());
        assert_eq!(scene.score_readout, Some(7));
    }

    #[test]
    fn empty_recommendations_hide_the_panel() {
        let mut scene = Scene::new();
        scene
            .render_recommendations(vec![RecommendationItem {
                text: "x".to_string(),
                critical: false,
            }])
            .expect("render");
        assert!(scene.recommendations_visible);
        scene.render_recommendations(vec![]).expect("render");
        assert!(!scene.recommendations_visible);
        assert!(scene.recommendations.is_empty());
    }

    #[test]
    fn showing_results_hides_a_leftover_error() {
        let mut scene = Scene::new();
        scene.show_error("Please enter a site URL.").expect("show error");
        scene.show_results().expect("show results");
        assert!(scene.results_visible);
        assert!(!scene.error_visible);
        assert_eq!(scene.error_message, None);
    }

    #[test]
    fn mount_identifiers_are_stable() {
        assert_eq!(MountId::ScoreBadge.as_str(), "scoreCircle");
        assert_eq!(MountId::ChecksContainer.to_string(), "checksAccordion");
    }
}
