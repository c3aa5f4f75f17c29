//! Drives a [`View`] through one scan at a time.
//!
//! `submit` moves to `Loading` and hands out a [`Ticket`]; the caller runs the
//! transport and passes the outcome back to `resolve` together with that ticket.
//! Only the newest ticket may touch the view, so a slow response to an older
//! submission is dropped even if it arrives last.

pub mod animation;
pub mod charts;

use std::time::Instant;

use crate::core::{
    CheckFailure, CheckResult, FailureKind, ScanReport, ValidationError, format_timestamp,
};
use crate::view::{ChartSurface, CheckItem, CheckSection, MountError, RecommendationItem, View};
use crate::visual::labels::{
    category_title, is_critical, level_text, score_annotation, status_icon, status_label,
};
use crate::visual::{
    clamp_percentage, color_for_percentage, group_by_category, ring_offset, status_counts,
};

use animation::{CancelToken, CountUp, SCORE_TICK, Step};
use charts::ChartSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: Ticket,
    /// The URL as it should be sent: trimmed.
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureState {
    Validation(ValidationError),
    Transport,
    Application(FailureKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Success,
    Failure(FailureState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Loading { ticket: Ticket },
    Settled(Settled),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Applied { render_errors: Vec<MountError> },
    /// A newer submission owns the view; nothing was written.
    Stale,
}

pub struct PresentationController<V: View> {
    view: V,
    state: State,
    generation: u64,
    count_up: Option<CountUp>,
    next_tick: Option<Instant>,
    category_chart: ChartSlot,
    status_chart: ChartSlot,
    render_errors: Vec<MountError>,
}

impl<V: View> PresentationController<V> {
    pub fn new(view: V) -> Self {
        Self {
            view,
            state: State::Idle,
            generation: 0,
            count_up: None,
            next_tick: None,
            category_chart: ChartSlot::new(ChartSurface::Category),
            status_chart: ChartSlot::new(ChartSurface::Status),
            render_errors: Vec::new(),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, State::Loading { .. })
    }

    /// Mount errors raised outside `resolve` (submission, animation ticks).
    pub fn take_render_errors(&mut self) -> Vec<MountError> {
        std::mem::take(&mut self.render_errors)
    }

    /// Validates `raw_url` and enters `Loading`. An empty URL shows the
    /// validation message and issues no ticket; a request already in flight
    /// keeps its ticket in that case.
    pub fn submit(&mut self, raw_url: &str) -> Result<Submission, ValidationError> {
        let url = raw_url.trim();
        if url.is_empty() {
            let err = ValidationError::EmptyUrl;
            let res = self.view.show_error(err.user_message());
            self.note(res);
            if !self.is_loading() {
                self.state = State::Settled(Settled::Failure(FailureState::Validation(err)));
            }
            return Err(err);
        }

        self.generation += 1;
        let ticket = Ticket {
            generation: self.generation,
        };
        self.cancel_count_up();

        let res = self.view.clear_panels();
        self.note(res);
        let res = self.view.set_busy(true);
        self.note(res);

        self.state = State::Loading { ticket };
        Ok(Submission {
            ticket,
            url: url.to_string(),
        })
    }

    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: Result<ScanReport, CheckFailure>,
    ) -> Resolution {
        if self.state != (State::Loading { ticket }) {
            return Resolution::Stale;
        }

        let mut errors = Vec::new();
        if let Err(e) = self.view.set_busy(false) {
            errors.push(e);
        }

        self.state = match outcome {
            Ok(report) => {
                self.render_report(&report, &mut errors);
                State::Settled(Settled::Success)
            }
            Err(failure) => {
                if let Err(e) = self.view.show_error(&failure.user_message()) {
                    errors.push(e);
                }
                State::Settled(Settled::Failure(match failure {
                    CheckFailure::Transport(_) => FailureState::Transport,
                    CheckFailure::Application(app) => FailureState::Application(app.kind),
                }))
            }
        };

        Resolution::Applied {
            render_errors: errors,
        }
    }

    fn render_report(&mut self, report: &ScanReport, errors: &mut Vec<MountError>) {
        let percentage = clamp_percentage(report.percentage);
        let mut push = |res: Result<(), MountError>| {
            if let Err(e) = res {
                errors.push(e);
            }
        };

        push(self.start_count_up(percentage));

        let color = color_for_percentage(percentage);
        push(self.view.set_ring(ring_offset(percentage), color.ring));
        push(self.view.set_badge(color));

        push(self.view.set_level(level_text(report.level)));
        push(
            self.view
                .set_checked_at(report.timestamp.as_deref().map(format_timestamp)),
        );

        push(
            self.category_chart
                .replace(&mut self.view, charts::category_chart(&report.categories)),
        );
        push(
            self.status_chart
                .replace(&mut self.view, charts::status_chart(status_counts(&report.checks))),
        );

        push(self.view.render_checks(check_sections(&report.checks)));
        push(
            self.view
                .render_recommendations(recommendation_items(&report.recommendations)),
        );

        push(self.view.show_results());
    }

    fn start_count_up(&mut self, target: f64) -> Result<(), MountError> {
        self.cancel_count_up();
        self.count_up = Some(CountUp::new(target, CancelToken::new()));
        self.next_tick = Some(Instant::now() + SCORE_TICK);
        self.view.set_score_readout(0)
    }

    fn cancel_count_up(&mut self) {
        if let Some(count) = self.count_up.take() {
            count.token().cancel();
        }
        self.next_tick = None;
    }

    pub fn is_animating(&self) -> bool {
        self.count_up.as_ref().is_some_and(|c| !c.is_finished())
    }

    /// When the next count-up tick is due, if one is running.
    pub fn next_tick_due(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Advances the count-up by one increment regardless of the clock.
    pub fn step_animation(&mut self) -> Option<Step> {
        let count = self.count_up.as_mut()?;
        let step = match count.step(&mut self.view) {
            Ok(step) => step,
            Err(e) => {
                self.render_errors.push(e);
                Step::Canceled
            }
        };
        if !matches!(step, Step::Wrote(_)) {
            self.count_up = None;
            self.next_tick = None;
        }
        Some(step)
    }

    /// Timer hook: performs at most one increment when its tick is due.
    pub fn on_tick(&mut self, now: Instant) {
        let Some(due) = self.next_tick else {
            return;
        };
        if now < due {
            return;
        }
        if self.step_animation().is_some() && self.count_up.is_some() {
            self.next_tick = Some(due + SCORE_TICK);
        }
    }

    /// Runs the remaining increments at once.
    pub fn finish_animation(&mut self) {
        while let Some(Step::Wrote(_)) = self.step_animation() {}
    }

    fn note(&mut self, res: Result<(), MountError>) {
        if let Err(e) = res {
            self.render_errors.push(e);
        }
    }
}

fn check_sections(checks: &[CheckResult]) -> Vec<CheckSection> {
    group_by_category(checks)
        .into_iter()
        .map(|group| CheckSection {
            category: group.category.to_string(),
            title: category_title(group.category).to_string(),
            expanded: true,
            items: group
                .checks
                .into_iter()
                .map(|check| CheckItem {
                    name: check.name.clone(),
                    message: check.message.clone(),
                    status: check.status.clone(),
                    icon: status_icon(&check.status),
                    badge: status_label(&check.status),
                    annotation: score_annotation(check.score),
                })
                .collect(),
        })
        .collect()
}

fn recommendation_items(recommendations: &[String]) -> Vec<RecommendationItem> {
    recommendations
        .iter()
        .map(|text| RecommendationItem {
            text: text.clone(),
            critical: is_critical(text),
        })
        .collect()
}
