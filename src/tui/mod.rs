//! Ratatui-based prediction form.
//!
//! The UI provides a form for the nine student inputs, then renders the
//! predicted final CGPA, its classification tier, and (optionally) the
//! per-feature explanation of that prediction.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{Prediction, Predictor};
use crate::domain::{PredictConfig, Tier};
use crate::error::AppError;
use crate::report::TOP_CONTRIBUTORS;

pub mod form;
mod plotters_chart;

use form::{FormRow, FormState, ROW_COUNT, field_text, row_at};
use plotters_chart::AttributionChart;

/// Load the predictor, then start the UI.
///
/// The model (and background sample) load before the terminal is touched, so
/// startup failures print to stderr and the form is never shown.
pub fn run(config: &PredictConfig) -> Result<(), AppError> {
    let background = config.explain.then_some(config.data_path.as_path());
    let predictor = Predictor::load(&config.model_path, background)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(predictor, config.model_path.clone());
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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

struct App {
    predictor: Predictor,
    model_path: PathBuf,
    form: FormState,
    show_explanation: bool,
    result: Option<Prediction>,
    status: String,
}

impl App {
    fn new(predictor: Predictor, model_path: PathBuf) -> Self {
        let show_explanation = predictor.can_explain();
        Self {
            predictor,
            model_path,
            form: FormState::default(),
            show_explanation,
            result: None,
            status: "Fill in the form, then press c to calculate.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
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

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        if self.form.editing.is_some() {
            self.handle_gpa_edit(code);
            return Ok(false);
        }

        match code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => self.form.select_prev(),
            KeyCode::Down => self.form.select_next(),
            KeyCode::Left => self.form.adjust(-1),
            KeyCode::Right => self.form.adjust(1),
            KeyCode::Char(' ') => self.form.toggle(),
            KeyCode::Enter => match self.form.row() {
                FormRow::Submit => self.submit()?,
                FormRow::Field(f) if f.is_flag() => self.form.toggle(),
                FormRow::Field(f) => {
                    if self.form.begin_edit() {
                        let label = f.label();
                        self.status = format!("Editing {label}. Enter to apply, Esc to cancel.");
                    }
                }
            },
            KeyCode::Char('c') => self.submit()?,
            KeyCode::Char('e') => {
                if self.predictor.can_explain() {
                    self.show_explanation = !self.show_explanation;
                } else {
                    self.status = "Explanations are off (started with --no-explain).".to_string();
                }
            }
            _ => {}
        }

        Ok(false)
    }

    fn handle_gpa_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.form.cancel_edit();
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => match self.form.apply_edit() {
                Ok(v) => self.status = format!("Set to {v:.2}."),
                Err(msg) => self.status = msg,
            },
            KeyCode::Backspace => self.form.pop_char(),
            KeyCode::Char(c) => self.form.push_char(c),
            _ => {}
        }
    }

    /// Input problems stay in the status line; internal failures end the session.
    fn submit(&mut self) -> Result<(), AppError> {
        let explain = self.predictor.can_explain();
        match self.predictor.predict(&self.form.inputs, explain) {
            Ok(p) => {
                tracing::info!(cgpa = p.cgpa, tier = p.tier.label(), "Form submitted");
                self.status = format!("Predicted {:.2} ({}).", p.cgpa, p.tier.label());
                self.result = Some(p);
                Ok(())
            }
            Err(err) if err.exit_code() == 4 => Err(err),
            Err(err) => {
                tracing::warn!(%err, "Prediction rejected");
                self.status = err.to_string();
                Ok(())
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let meta = &self.predictor.artifact().metadata;
        let r2 = crate::report::fmt_r2(meta.test_r2, 3);

        let lines = vec![
            Line::from(vec![
                Span::styled("cgpa", Style::default().fg(Color::Cyan)),
                Span::raw(" - Final-year CGPA predictor"),
            ]),
            Line::from(Span::styled(
                format!(
                    "model: {} | trees: {} | trained: {} | held-out R²: {r2}",
                    self.model_path.display(),
                    meta.n_estimators,
                    meta.trained_at.format("%Y-%m-%d %H:%M"),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(58), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(columns[1]);

        self.draw_result(frame, right[0]);
        self.draw_explanation(frame, right[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let gray = Style::default().fg(Color::Gray);
        let items: Vec<ListItem> = (0..ROW_COUNT)
            .map(|i| match row_at(i) {
                FormRow::Field(feature) => {
                    let editing = (i == self.form.selected)
                        .then_some(self.form.editing.as_deref())
                        .flatten();
                    let value = match editing {
                        Some(buf) => Span::styled(
                            format!("{buf}▏"),
                            Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                        ),
                        None => Span::raw(field_text(&self.form.inputs, feature)),
                    };
                    let mut spans = vec![Span::raw(format!("{:<28} ", feature.label())), value];
                    if let Some(help) = feature.help() {
                        spans.push(Span::styled(format!("  {help}"), gray));
                    }
                    ListItem::new(Line::from(spans))
                }
                FormRow::Submit => ListItem::new(Line::from(Span::styled(
                    "[ Calculate Final CGPA ]",
                    Style::default().add_modifier(Modifier::BOLD),
                ))),
            })
            .collect();

        let list = List::new(items)
            .block(Block::bordered().title("Student Details"))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.form.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_result(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::bordered().title("Predicted Final CGPA");

        let text = match &self.result {
            Some(p) => {
                let style = tier_style(p.tier).add_modifier(Modifier::BOLD);
                Text::from(vec![
                    Line::from(Span::styled(format!("{:.2}", p.cgpa), style)),
                    Line::from(Span::styled(p.tier.label(), style)),
                ])
            }
            None => Text::from(Line::from(Span::styled(
                "No prediction yet.",
                Style::default().fg(Color::Gray),
            ))),
        };

        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn draw_explanation(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::bordered().title("Why this prediction?");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if !self.predictor.can_explain() {
            frame.render_widget(hint("Explanations disabled."), inner);
            return;
        }
        if !self.show_explanation {
            frame.render_widget(hint("Press e to show the explanation."), inner);
            return;
        }
        let Some(explanation) = self.result.as_ref().and_then(|p| p.explanation.as_ref()) else {
            frame.render_widget(hint("Calculate a prediction to see what drove it."), inner);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(TOP_CONTRIBUTORS as u16 + 2),
            ])
            .split(inner);

        let bars: Vec<(&'static str, f64)> = explanation
            .attributions
            .iter()
            .map(|a| (a.feature.column(), a.contribution))
            .collect();
        let chart = AttributionChart {
            bars: &bars,
            x_bound: AttributionChart::bound_for(&bars),
        };
        frame.render_widget(chart, chunks[0]);

        let mut lines = vec![Line::from(Span::styled(
            format!("Base value: {:.3}", explanation.base_value),
            Style::default().fg(Color::Gray),
        ))];
        lines.push(Line::from("Top contributors:"));
        for a in explanation.top_contributors(TOP_CONTRIBUTORS) {
            lines.push(Line::from(format!("  {}", a.describe())));
        }
        frame.render_widget(Paragraph::new(Text::from(lines)), chunks[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = [
            "↑/↓ select  ←/→ adjust  Space toggle",
            "Enter edit/submit  c calculate  e explain  q quit",
        ]
        .join("  ");
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn tier_style(tier: Tier) -> Style {
    let (r, g, b) = tier.rgb();
    Style::default().fg(Color::Rgb(r, g, b))
}

fn hint(msg: &str) -> Paragraph<'static> {
    Paragraph::new(msg.to_string()).style(Style::default().fg(Color::Gray))
}
