//! Ratatui-based terminal UI.
//!
//! The interactive shell: a pH slider and two toggles on the left of the
//! footer, and the chart, swatch, gradient bar and RGB readout in the body.
//! Every control change builds a fresh `RenderRequest` and re-runs the
//! request handler.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::warn;
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::pipeline::RenderResult;
use crate::domain::{CalibrationSet, Channel, FitMode, LabConfig, PH_MAX, PH_MIN, PH_STEP, RenderRequest, Rgb, snap_ph};
use crate::error::AppError;

mod plotters_chart;
mod raster;

use plotters_chart::{ChannelChart, ChartSeries};
use raster::RasterWidget;

/// Start the TUI.
pub fn run(request: RenderRequest, config: LabConfig, snapshot_dir: PathBuf) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(request, config, snapshot_dir);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Quit,
    NudgePh(f64),
    SetPh(f64),
    TogglePoints,
    ToggleSigmoid,
    Export,
    None,
}

fn action_for(code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left => Action::NudgePh(-PH_STEP),
        KeyCode::Right => Action::NudgePh(PH_STEP),
        KeyCode::PageDown | KeyCode::Down => Action::NudgePh(-1.0),
        KeyCode::PageUp | KeyCode::Up => Action::NudgePh(1.0),
        KeyCode::Home => Action::SetPh(PH_MIN),
        KeyCode::End => Action::SetPh(PH_MAX),
        KeyCode::Char('p') => Action::TogglePoints,
        KeyCode::Char('s') => Action::ToggleSigmoid,
        KeyCode::Char('e') => Action::Export,
        _ => Action::None,
    }
}

struct App {
    request: RenderRequest,
    config: LabConfig,
    snapshot_dir: PathBuf,
    status: String,
    /// Last successful render; kept when a later request fails.
    result: Option<RenderResult>,
}

impl App {
    fn new(request: RenderRequest, config: LabConfig, snapshot_dir: PathBuf) -> Self {
        let mut app = Self {
            request: request.normalized(),
            config,
            snapshot_dir,
            status: String::new(),
            result: None,
        };
        app.rerender();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.apply(action_for(key.code)) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply an action; returns `true` when the app should exit.
    fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::NudgePh(delta) => self.set_ph(self.request.ph + delta),
            Action::SetPh(ph) => self.set_ph(ph),
            Action::TogglePoints => {
                self.request.show_points = !self.request.show_points;
                self.rerender();
            }
            Action::ToggleSigmoid => {
                self.request.use_sigmoid = !self.request.use_sigmoid;
                self.rerender();
            }
            Action::Export => self.export(),
            Action::None => {}
        }
        false
    }

    fn set_ph(&mut self, ph: f64) {
        let ph = snap_ph(ph);
        if ph != self.request.ph {
            self.request.ph = ph;
            self.rerender();
        }
    }

    fn rerender(&mut self) {
        match crate::app::pipeline::handle(self.request, &self.config) {
            Ok(result) => {
                self.status = format!(
                    "pH {:.1} | {} fit",
                    result.request.ph,
                    result.curves.mode.display_name()
                );
                self.result = Some(result);
            }
            Err(err) => {
                warn!("render failed for {:?}: {err}", self.request);
                self.status = format!("Render failed: {err}");
            }
        }
    }

    fn export(&mut self) {
        let Some(result) = &self.result else {
            self.status = "Nothing to export yet.".to_string();
            return;
        };
        match crate::io::export::write_snapshot_bundle(result, &CalibrationSet::standard(), &self.snapshot_dir) {
            Ok(path) => self.status = format!("Wrote snapshot: {}", path.display()),
            Err(err) => self.status = format!("Export failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let on_off = |v: bool| if v { "on" } else { "off" };
        let lines = vec![
            Line::from(vec![
                Span::styled("phlab", Style::default().fg(Color::Cyan)),
                Span::raw(" - pH color lab"),
            ]),
            Line::from(vec![
                Span::styled(
                    format!("pH {:>4.1} ", self.request.ph),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(slider_bar(self.request.ph, 28)),
                Span::styled(
                    format!(
                        "  data points: {} | sigmoid fit: {}",
                        on_off(self.request.show_points),
                        on_off(self.request.use_sigmoid)
                    ),
                    Style::default().fg(Color::Gray),
                ),
            ]),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(5), Constraint::Length(4)])
            .split(columns[1]);

        self.draw_chart(frame, columns[0]);
        self.draw_swatch(frame, side[0]);
        self.draw_gradient(frame, side[1]);
        self.draw_readout(frame, side[2]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self
            .result
            .as_ref()
            .map(|r| format!("pH vs RGB ({})", r.curves.mode.display_name()))
            .unwrap_or_else(|| "pH vs RGB".to_string());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(result) = &self.result else {
            let msg = Paragraph::new("No curves to show.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let curves: Vec<ChartSeries<'_>> = result
            .curves
            .iter()
            .map(|c| ChartSeries {
                color: plot_color(c.channel.plot_color()),
                data: &c.samples,
                label: Some(series_label(c.channel, result.curves.mode)),
            })
            .collect();
        let points: Vec<ChartSeries<'_>> = result
            .points
            .iter()
            .map(|s| ChartSeries {
                color: plot_color(s.channel.plot_color()),
                data: &s.points,
                label: None,
            })
            .collect();

        let widget = ChannelChart {
            curves: &curves,
            points: &points,
            marker_ph: Some(result.request.ph),
            x_bounds: [PH_MIN, PH_MAX],
            y_bounds: chart_y_bounds(result),
        };
        frame.render_widget(widget, inner);
    }

    fn draw_swatch(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!("Virtual tube (pH {:.1})", self.request.ph);
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(result) = &self.result {
            frame.render_widget(RasterWidget { image: &result.swatch, keep_aspect: true }, inner);
        }
    }

    fn draw_gradient(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("pH 0-14 gradient").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(result) = &self.result else {
            return;
        };
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let bar = Rect {
            height: inner.height.saturating_sub(1).max(1),
            ..inner
        };
        frame.render_widget(RasterWidget { image: &result.gradient, keep_aspect: false }, bar);

        if inner.height >= 2 {
            let col = marker_offset(result.request.ph, inner.width);
            let marker = Paragraph::new("▲").style(Style::default().fg(Color::White));
            let rect = Rect {
                x: inner.x + col,
                y: inner.y + inner.height - 1,
                width: 1,
                height: 1,
            };
            frame.render_widget(marker, rect);
        }
    }

    fn draw_readout(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Color").borders(Borders::ALL);
        let Some(result) = &self.result else {
            frame.render_widget(block, area);
            return;
        };

        let Rgb { r, g, b } = result.rgb;
        let line = Line::from(vec![
            Span::styled("██████ ", Style::default().fg(Color::Rgb(r, g, b))),
            Span::styled(
                crate::report::format_rgb_line(result.rgb),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ ±0.1  PgUp/PgDn ±1  Home/End 0/14  p points  s sigmoid  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Legend text for a channel curve, e.g. `Red (Sigmoid)`.
fn series_label(channel: Channel, mode: FitMode) -> String {
    format!("{} ({})", channel.display_name(), mode.display_name())
}

fn plot_color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.r, rgb.g, rgb.b)
}

/// Y bounds covering all curves and points, padded by 5%.
fn chart_y_bounds(result: &RenderResult) -> [f64; 2] {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let curve_ys = result.curves.iter().flat_map(|c| c.samples.iter().map(|&(_, y)| y));
    let point_ys = result.points.iter().flat_map(|s| s.points.iter().map(|&(_, y)| y));
    for y in curve_ys.chain(point_ys) {
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        return [0.0, 255.0];
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min - pad, y_max + pad]
}

/// Cell offset of the slider marker under a `width`-cell gradient bar.
fn marker_offset(ph: f64, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let col = crate::render::gradient_column(ph);
    let cells = f64::from(col) / f64::from(crate::render::GRADIENT_WIDTH) * f64::from(width);
    (cells.floor() as u16).min(width - 1)
}

/// Text slider, e.g. `[━━━━━━●───────]`.
fn slider_bar(ph: f64, width: usize) -> String {
    let width = width.max(2);
    let u = ((ph - PH_MIN) / (PH_MAX - PH_MIN)).clamp(0.0, 1.0);
    let knob = (u * (width as f64 - 1.0)).round() as usize;
    let mut out = String::from("[");
    for i in 0..width {
        out.push(if i == knob {
            '●'
        } else if i < knob {
            '━'
        } else {
            '─'
        });
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(RenderRequest::default(), LabConfig::default(), std::env::temp_dir())
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(action_for(KeyCode::Char('q')), Action::Quit);
        assert_eq!(action_for(KeyCode::Right), Action::NudgePh(PH_STEP));
        assert_eq!(action_for(KeyCode::Home), Action::SetPh(0.0));
        assert_eq!(action_for(KeyCode::Char('x')), Action::None);
    }

    #[test]
    fn nudging_ph_rerenders_and_clamps() {
        let mut app = test_app();
        assert!(app.result.is_some());

        app.apply(Action::NudgePh(PH_STEP));
        assert_eq!(app.request.ph, 7.1);
        assert_eq!(app.result.as_ref().unwrap().request.ph, 7.1);

        app.apply(Action::SetPh(PH_MAX));
        app.apply(Action::NudgePh(1.0));
        assert_eq!(app.request.ph, 14.0);
        assert_eq!(app.result.as_ref().unwrap().rgb, Rgb::new(0, 255, 31));
    }

    #[test]
    fn repeated_steps_do_not_drift() {
        let mut app = test_app();
        app.apply(Action::SetPh(0.0));
        for _ in 0..70 {
            app.apply(Action::NudgePh(PH_STEP));
        }
        assert_eq!(app.request.ph, 7.0);
    }

    #[test]
    fn toggles_flip_request_flags() {
        let mut app = test_app();
        app.apply(Action::TogglePoints);
        assert!(app.result.as_ref().unwrap().points.is_empty());
        app.apply(Action::ToggleSigmoid);
        let result = app.result.as_ref().unwrap();
        assert_eq!(result.curves.mode, FitMode::Linear);
        assert!(app.status.contains("Linear"));
    }

    #[test]
    fn failed_render_keeps_previous_result() {
        let mut app = test_app();
        app.config.max_evals = 1;
        app.apply(Action::NudgePh(PH_STEP));
        assert!(app.status.starts_with("Render failed"));
        // The last good render is still on screen.
        assert_eq!(app.result.as_ref().unwrap().request.ph, 7.0);
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = test_app();
        assert!(app.apply(Action::Quit));
        assert!(!app.apply(Action::None));
    }

    #[test]
    fn chart_bounds_cover_calibration_range() {
        let app = test_app();
        let [lo, hi] = chart_y_bounds(app.result.as_ref().unwrap());
        assert!(lo < 20.0 && hi > 230.0);
    }

    #[test]
    fn legend_names_channel_and_mode() {
        assert_eq!(series_label(Channel::Red, FitMode::Sigmoid), "Red (Sigmoid)");
        assert_eq!(series_label(Channel::Green, FitMode::Linear), "Green (Linear)");
    }

    #[test]
    fn marker_and_slider_track_ph() {
        assert_eq!(marker_offset(0.0, 40), 0);
        assert_eq!(marker_offset(7.0, 40), 20);
        assert_eq!(marker_offset(14.0, 40), 39);
        assert_eq!(slider_bar(0.0, 5), "[●────]");
        assert_eq!(slider_bar(14.0, 5), "[━━━━●]");
    }
}
