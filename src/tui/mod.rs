use std::io;
use std::panic;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph, Wrap};

use crate::controller::{PresentationController, Resolution, Ticket};
use crate::core::{CheckFailure, ScanReport, Status};
use crate::transport::Transport;
use crate::view::{BoundChart, ChartKind, Scene};
use crate::visual::labels::status_color;
use crate::visual::{Rgb, circumference};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

type Outcome = (Ticket, Result<ScanReport, CheckFailure>);

pub fn run<T>(transport: T, color: bool, animate: bool) -> Result<()>
where
    T: Transport + Clone + Send + 'static,
{
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter the alternate screen")?;

    let mut tui = Tui {
        terminal: Terminal::new(CrosstermBackend::new(stdout))
            .context("failed to initialise the terminal")?,
    };
    tui.terminal.clear().ok();

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        run_app(&mut tui.terminal, App::new(transport, color, animate))
    }));

    let _ = tui.terminal.show_cursor();
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);

    match res {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!(
            "the terminal UI panicked (the terminal state should have been restored)"
        )),
    }
}

struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    Checks,
}

struct App<T> {
    ctl: PresentationController<Scene>,
    transport: T,
    color: bool,
    animate: bool,
    focus: Focus,
    selected_section: usize,
    in_flight: usize,
    tx: mpsc::Sender<Outcome>,
    rx: mpsc::Receiver<Outcome>,
    tick: u64,
    status_line: Option<String>,
}

impl<T> App<T>
where
    T: Transport + Clone + Send + 'static,
{
    fn new(transport: T, color: bool, animate: bool) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            ctl: PresentationController::new(Scene::new()),
            transport,
            color,
            animate,
            focus: Focus::Input,
            selected_section: 0,
            in_flight: 0,
            tx,
            rx,
            tick: 0,
            status_line: None,
        }
    }

    fn scene(&self) -> &Scene {
        self.ctl.view()
    }

    /// Submits the URL in the input line. Every accepted submission runs on
    /// its own worker; older workers are left to finish and get dropped as
    /// stale when they report back.
    fn submit(&mut self) {
        let input = self.scene().url_input.clone();
        let Ok(submission) = self.ctl.submit(&input) else {
            return;
        };
        self.selected_section = 0;
        self.status_line = None;

        let tx = self.tx.clone();
        let transport = self.transport.clone();
        thread::spawn(move || {
            let outcome = transport.check(&submission.url);
            let _ = tx.send((submission.ticket, outcome));
        });
        self.in_flight += 1;
    }

    fn drain_outcomes(&mut self) {
        while let Ok((ticket, outcome)) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            match self.ctl.resolve(ticket, outcome) {
                Resolution::Applied { render_errors } => {
                    if !self.animate {
                        self.ctl.finish_animation();
                    }
                    self.status_line = match render_errors.as_slice() {
                        [] => None,
                        [only] => Some(format!("render: {only}")),
                        [first, rest @ ..] => {
                            Some(format!("render: {first} (+{} more)", rest.len()))
                        }
                    };
                }
                Resolution::Stale => {
                    self.status_line = Some("dropped a response to an older submission".to_string());
                }
            }
        }
    }

    fn toggle_selected_section(&mut self) {
        let idx = self.selected_section;
        if let Some(section) = self.ctl.view_mut().check_sections.get_mut(idx) {
            section.expanded = !section.expanded;
        }
    }

    fn move_selection(&mut self, down: bool) {
        let count = self.scene().check_sections.len();
        if count == 0 {
            return;
        }
        self.selected_section = if down {
            (self.selected_section + 1).min(count - 1)
        } else {
            self.selected_section.saturating_sub(1)
        };
    }
}

fn run_app<B, T>(terminal: &mut Terminal<B>, mut app: App<T>) -> Result<()>
where
    B: Backend,
    T: Transport + Clone + Send + 'static,
{
    let tick_rate = Duration::from_millis(120);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw(f, &app)).context("failed to draw")?;

        app.drain_outcomes();
        app.ctl.on_tick(Instant::now());

        let mut timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if let Some(due) = app.ctl.next_tick_due() {
            timeout = timeout.min(due.saturating_duration_since(Instant::now()));
        }
        if event::poll(timeout).context("failed to poll for events")? {
            if let Event::Key(key) = event::read().context("failed to read an event")? {
                if key.kind == KeyEventKind::Press && handle_key(&mut app, key) {
                    break;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick = app.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }

    Ok(())
}

/// Returns `true` when the UI should exit.
fn handle_key<T>(app: &mut App<T>, key: KeyEvent) -> bool
where
    T: Transport + Clone + Send + 'static,
{
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match (app.focus, key.code) {
        (_, KeyCode::Esc) => return true,
        (_, KeyCode::Tab) => {
            app.focus = match app.focus {
                Focus::Input => Focus::Checks,
                Focus::Checks => Focus::Input,
            };
        }
        (Focus::Input, KeyCode::Enter) => app.submit(),
        (Focus::Input, KeyCode::Backspace) => {
            app.ctl.view_mut().url_input.pop();
        }
        (Focus::Input, KeyCode::Char(c)) => app.ctl.view_mut().url_input.push(c),
        (Focus::Checks, KeyCode::Enter | KeyCode::Char(' ')) => app.toggle_selected_section(),
        (Focus::Checks, KeyCode::Down | KeyCode::Char('j')) => app.move_selection(true),
        (Focus::Checks, KeyCode::Up | KeyCode::Char('k')) => app.move_selection(false),
        _ => {}
    }
    false
}

fn draw<T>(f: &mut ratatui::Frame, app: &App<T>) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(size);

    draw_header(f, chunks[0]);
    draw_input(f, chunks[1], app);
    let scene = app.ctl.view();
    if scene.error_visible {
        draw_error(f, chunks[2], scene, app.color);
    } else if scene.results_visible {
        draw_results(f, chunks[2], app);
    } else {
        let hint = Paragraph::new("Type a site URL and press Enter to check it.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(hint, chunks[2]);
    }
    draw_footer(f, chunks[3], app);
}

fn draw_header(f: &mut ratatui::Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            "sitescore · website security score",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let w = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(w, area);
}

fn draw_input<T>(f: &mut ratatui::Frame, area: Rect, app: &App<T>) {
    let scene = app.ctl.view();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(18)])
        .split(area);

    let focused = app.focus == Focus::Input;
    let border = if focused && app.color {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let cursor = if focused { "▏" } else { "" };
    let input = Paragraph::new(format!("{}{cursor}", scene.url_input)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("Site URL"),
    );
    f.render_widget(input, chunks[0]);

    let control = if scene.spinner_visible {
        let frame = SPINNER[(app.tick as usize) % SPINNER.len()];
        Line::from(vec![
            Span::styled(frame, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Checking..."),
        ])
    } else {
        Line::from(Span::styled(
            "Check ⏎",
            Style::default().add_modifier(Modifier::BOLD),
        ))
    };
    let control_style = if scene.submit_enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let w = Paragraph::new(control)
        .style(control_style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(w, chunks[1]);
}

fn draw_error(f: &mut ratatui::Frame, area: Rect, scene: &Scene, color: bool) {
    let message = scene.error_message.as_deref().unwrap_or("");
    let style = if color {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let w = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title("Error"),
        );
    f.render_widget(w, area);
}

fn draw_results<T>(f: &mut ratatui::Frame, area: Rect, app: &App<T>) {
    let scene = app.ctl.view();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Min(3),
        ])
        .split(area);

    draw_score(f, rows[0], scene, app.color);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);
    if let Some(chart) = &scene.category_chart {
        draw_category_chart(f, charts[0], chart, app.color);
    }
    if let Some(chart) = &scene.status_chart {
        draw_status_chart(f, charts[1], chart, app.color);
    }

    let bottom = if scene.recommendations_visible {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[2])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)])
            .split(rows[2])
    };
    draw_checks(f, bottom[0], app);
    if scene.recommendations_visible {
        draw_recommendations(f, bottom[1], scene, app.color);
    }
}

fn draw_score(f: &mut ratatui::Frame, area: Rect, scene: &Scene, color: bool) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(10)])
        .split(area);

    let readout = scene.score_readout.unwrap_or(0);
    let (ratio, ring_color) = match scene.ring {
        Some(ring) => (
            (1.0 - ring.offset / circumference()).clamp(0.0, 1.0),
            Some(ring.color),
        ),
        None => (0.0, None),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Score"))
        .gauge_style(rgb_style(ring_color, color))
        .ratio(ratio)
        .label(format!("{readout}%"));
    f.render_widget(gauge, cols[0]);

    let mut lines = Vec::new();
    if let Some(level) = scene.level {
        lines.push(Line::from(Span::styled(
            level.title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(level.description));
    }
    if let Some(checked_at) = &scene.checked_at {
        lines.push(Line::from(Span::styled(
            format!("Checked at {checked_at}"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(badge) = scene.badge {
        lines.push(Line::from(vec![
            Span::styled("███", rgb_style(Some(badge.badge_start), color)),
            Span::styled("███", rgb_style(Some(badge.badge_end), color)),
            Span::raw(format!(" {}", badge.ring)),
        ]));
    }
    let w = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Level"));
    f.render_widget(w, cols[1]);
}

fn draw_category_chart(f: &mut ratatui::Frame, area: Rect, chart: &BoundChart, color: bool) {
    let max = match chart.spec.kind {
        ChartKind::Bar { max } => max,
        ChartKind::Doughnut => 100.0,
    };
    let bars: Vec<Bar> = chart
        .spec
        .points
        .iter()
        .map(|p| {
            Bar::default()
                .value(p.value.max(0.0).round() as u64)
                .label(Line::from(p.label.clone()))
                .style(rgb_style(Some(p.color), color))
        })
        .collect();
    let w = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Categories"))
        .bar_width(9)
        .bar_gap(1)
        .max(max.max(1.0).round() as u64)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(w, area);
}

fn draw_status_chart(f: &mut ratatui::Frame, area: Rect, chart: &BoundChart, color: bool) {
    let total: f64 = chart.spec.points.iter().map(|p| p.value).sum();
    let lines: Vec<Line> = chart
        .spec
        .points
        .iter()
        .map(|p| {
            let share = if total > 0.0 {
                p.value / total * 100.0
            } else {
                0.0
            };
            Line::from(vec![
                Span::styled("● ", rgb_style(Some(p.color), color)),
                Span::raw(format!("{:<8} {:>3}  {share:>3.0}%", p.label, p.value)),
            ])
        })
        .collect();
    let w = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Check status"));
    f.render_widget(w, area);
}

fn draw_checks<T>(f: &mut ratatui::Frame, area: Rect, app: &App<T>) {
    let scene = app.ctl.view();
    let focused = app.focus == Focus::Checks;
    let mut lines = Vec::new();
    let mut selected_line = 0usize;

    for (idx, section) in scene.check_sections.iter().enumerate() {
        let marker = if section.expanded { "▾" } else { "▸" };
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if focused && idx == app.selected_section {
            style = style.add_modifier(Modifier::REVERSED);
            selected_line = lines.len();
        }
        lines.push(Line::from(Span::styled(
            format!("{marker} {} ({})", section.title, section.items.len()),
            style,
        )));
        if !section.expanded {
            continue;
        }
        for item in &section.items {
            let badge_color = status_color(&item.status);
            let mut spans = vec![
                Span::raw("  "),
                Span::styled(item.icon.unwrap_or("•"), rgb_style(badge_color, app.color)),
                Span::raw(format!(" {}  ", item.name)),
                Span::styled(
                    format!("[{}]", item.badge.unwrap_or(item.status.as_str())),
                    rgb_style(badge_color, app.color),
                ),
            ];
            if let Some(annotation) = &item.annotation {
                spans.push(Span::styled(
                    format!("  {annotation}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            lines.push(Line::from(spans));
            if !item.message.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("      {}", item.message),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    let visible = area.height.saturating_sub(2) as usize;
    let scroll = selected_line.saturating_sub(visible / 2);
    let border = if focused && app.color {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let w = Paragraph::new(Text::from(lines))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title("Checks"),
        );
    f.render_widget(w, area);
}

fn draw_recommendations(f: &mut ratatui::Frame, area: Rect, scene: &Scene, color: bool) {
    let critical = rgb_style(status_color(&Status::Danger), color).add_modifier(Modifier::BOLD);
    let lines: Vec<Line> = scene
        .recommendations
        .iter()
        .map(|item| {
            if item.critical {
                Line::from(Span::styled(format!("! {}", item.text), critical))
            } else {
                Line::from(format!("- {}", item.text))
            }
        })
        .collect();
    let w = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Recommendations"),
        );
    f.render_widget(w, area);
}

fn draw_footer<T>(f: &mut ratatui::Frame, area: Rect, app: &App<T>) {
    let keys = match app.focus {
        Focus::Input => "Enter: check  Tab: checks  Esc: quit",
        Focus::Checks => "Enter/Space: expand/collapse  ↑/↓: select  Tab: input  Esc: quit",
    };
    let mut lines = vec![Line::from(Span::styled(
        keys,
        Style::default().fg(Color::DarkGray),
    ))];
    if let Some(status) = &app.status_line {
        lines.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        )));
    } else if app.in_flight > 1 {
        lines.push(Line::from(format!("{} requests in flight", app.in_flight)));
    }
    f.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn rgb_style(rgb: Option<Rgb>, enabled: bool) -> Style {
    match rgb {
        Some(c) if enabled => Style::default().fg(Color::Rgb(c.r, c.g, c.b)),
        _ => Style::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CheckResult, Level, TransportError};
    use ratatui::backend::TestBackend;

    #[derive(Clone)]
    struct StubTransport {
        percentage: f64,
    }

    impl Transport for StubTransport {
        fn check(&self, url: &str) -> Result<ScanReport, CheckFailure> {
            if url.contains("down") {
                return Err(TransportError::Network("connection refused".to_string()).into());
            }
            let mut categories = hashlink::LinkedHashMap::new();
            categories.insert("headers".to_string(), 40.0);
            categories.insert("cookies".to_string(), 80.0);
            Ok(ScanReport {
                success: true,
                url: Some(url.to_string()),
                percentage: self.percentage,
                level: Level::Satisfactory,
                categories,
                checks: vec![
                    CheckResult::new("HSTS", "headers", Status::Warning, 0.5, "short max-age"),
                    CheckResult::new("HttpOnly", "cookies", Status::Success, 1.0, "set"),
                ],
                recommendations: vec!["Raise HSTS max-age".to_string()],
                timestamp: Some("2026-02-02T12:00:00".to_string()),
                ..ScanReport::default()
            })
        }
    }

    fn app() -> App<StubTransport> {
        App::new(StubTransport { percentage: 64.0 }, false, false)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App<StubTransport>, text: &str) {
        for c in text.chars() {
            assert!(!handle_key(app, key(KeyCode::Char(c))));
        }
    }

    fn wait_for_outcomes(app: &mut App<StubTransport>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.in_flight > 0 && Instant::now() < deadline {
            app.drain_outcomes();
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(app.in_flight, 0, "worker did not report back");
    }

    #[test]
    fn enter_on_empty_input_shows_validation_error() {
        let mut app = app();
        assert!(!handle_key(&mut app, key(KeyCode::Enter)));
        assert_eq!(app.in_flight, 0);
        assert!(app.scene().error_visible);
        assert_eq!(
            app.scene().error_message.as_deref(),
            Some("Please enter a site URL.")
        );
    }

    #[test]
    fn submitted_check_renders_results() {
        let mut app = app();
        type_text(&mut app, "example.org");
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.scene().spinner_visible);
        wait_for_outcomes(&mut app);

        let scene = app.scene();
        assert!(scene.results_visible);
        assert!(!scene.spinner_visible);
        assert_eq!(scene.score_readout, Some(64));
        assert_eq!(scene.check_sections.len(), 2);
        assert_eq!(app.status_line, None);
    }

    #[test]
    fn transport_failure_shows_error_panel() {
        let mut app = app();
        type_text(&mut app, "down.example");
        handle_key(&mut app, key(KeyCode::Enter));
        wait_for_outcomes(&mut app);
        assert!(app.scene().error_visible);
        assert!(!app.scene().results_visible);
    }

    #[test]
    fn stale_outcome_is_reported_not_rendered() {
        let mut app = app();
        type_text(&mut app, "a.example");
        handle_key(&mut app, key(KeyCode::Enter));
        wait_for_outcomes(&mut app);
        let old = app.ctl.submit("b.example").expect("valid url").ticket;
        let new = app.ctl.submit("c.example").expect("valid url");
        app.tx
            .send((old, Err(TransportError::Status(500).into())))
            .expect("send");
        app.in_flight += 1;
        app.drain_outcomes();

        assert!(!app.scene().error_visible);
        assert!(app.ctl.is_loading());
        assert_eq!(
            app.status_line.as_deref(),
            Some("dropped a response to an older submission")
        );
        assert_ne!(old, new.ticket);
    }

    #[test]
    fn tab_then_space_collapses_selected_section() {
        let mut app = app();
        type_text(&mut app, "example.org");
        handle_key(&mut app, key(KeyCode::Enter));
        wait_for_outcomes(&mut app);

        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Char(' ')));
        assert!(app.scene().check_sections[0].expanded);
        assert!(!app.scene().check_sections[1].expanded);

        handle_key(&mut app, key(KeyCode::Tab));
        type_text(&mut app, "x");
        assert_eq!(app.scene().url_input, "example.orgx");
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut app = app();
        assert!(handle_key(&mut app, key(KeyCode::Esc)));
        assert!(handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ));
    }

    #[test]
    fn draw_results_fits_small_terminal() {
        let mut app = app();
        type_text(&mut app, "example.org");
        handle_key(&mut app, key(KeyCode::Enter));
        wait_for_outcomes(&mut app);

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).expect("terminal");
        terminal.draw(|f| draw(f, &app)).expect("draw");
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Security headers"));
        assert!(text.contains("Recommendations"));
        assert!(text.contains("64%"));
    }
}
