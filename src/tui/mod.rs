//! Ratatui-based terminal UI.
//!
//! Two screens: an input form (ticker, market, submit) and a results view
//! showing the chart preview, the saved image path and the narrative.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::{error, info};

use crate::app::pipeline::{self, AnalysisOutput};
use crate::chart::{PanelData, PanelStyle, fonts};
use crate::cli::TuiArgs;
use crate::config::AppConfig;
use crate::data::AlphaVantageClient;
use crate::error::AppError;
use crate::insight::GeminiClient;

mod plotters_chart;
pub mod state;

use plotters_chart::PanelChart;
use state::{Field, Screen, Session, Status};

/// Start the TUI.
pub fn run(config: AppConfig, args: TuiArgs) -> Result<(), AppError> {
    // Build clients before touching the terminal so setup errors print normally.
    let mut app = App::new(config, &args)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Submit,
    Quit,
}

struct App {
    session: Session,
    config: AppConfig,
    quotes: AlphaVantageClient,
    insights: GeminiClient,
    /// Chart preview for the current results screen.
    preview: Option<PanelData>,
    chart_text: bool,
    scroll: u16,
}

impl App {
    fn new(config: AppConfig, args: &TuiArgs) -> Result<Self, AppError> {
        let quotes = AlphaVantageClient::from_config(&config)?;
        let insights = GeminiClient::from_config(&config)?;
        Ok(Self {
            session: Session::new(&args.ticker, args.market),
            chart_text: fonts::ensure_font(config.font_path.as_deref()),
            config,
            quotes,
            insights,
            preview: None,
            scroll: 0,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                self.redraw(terminal)?;
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
                    match self.handle_key(key) {
                        Action::Quit => break,
                        Action::Submit => {
                            self.session.status = Status::Info("Analyzing... Please wait...".to_string());
                            self.redraw(terminal)?;
                            self.submit();
                        }
                        Action::None => {}
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

    fn redraw<B: ratatui::backend::Backend>(&self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        terminal
            .draw(|f| self.draw(f))
            .map(|_| ())
            .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        match self.session.screen {
            Screen::Input => self.handle_input_key(key.code),
            Screen::Results(_) => self.handle_results_key(key.code),
        }
    }

    fn handle_input_key(&mut self, code: KeyCode) -> Action {
        let form = &mut self.session.form;
        match code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Enter => return Action::Submit,
            KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
            KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
            KeyCode::Backspace if form.focus == Field::Ticker => form.pop_char(),
            KeyCode::Char(c) if form.focus == Field::Ticker => form.push_char(c),
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Left if form.focus == Field::Market => form.market = form.market.prev(),
            KeyCode::Right | KeyCode::Char(' ') if form.focus == Field::Market => {
                form.market = form.market.next();
            }
            _ => {}
        }
        Action::None
    }

    fn handle_results_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => {
                self.session.back();
                self.preview = None;
                self.scroll = 0;
            }
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            _ => {}
        }
        Action::None
    }

    fn submit(&mut self) {
        let (config, quotes, insights) = (&self.config, &self.quotes, &self.insights);
        self.session.submit(|ticker, market| {
            let output_path = config.chart_path_for(ticker, market);
            pipeline::analyze(ticker, market, quotes, insights, &output_path)
        });

        match &self.session.status {
            Status::Error(msg) => error!(%msg, "analysis failed"),
            Status::Info(msg) => info!(%msg, "analysis finished"),
            Status::Idle => {}
        }

        self.scroll = 0;
        self.preview = self
            .session
            .results()
            .and_then(|out| PanelData::from_table(&out.run.table, &out.run.ticker, out.run.market));
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        match self.session.results() {
            Some(out) => {
                draw_results_header(frame, chunks[0], out);
                self.draw_results_body(frame, chunks[1], out);
            }
            None => {
                draw_input_header(frame, chunks[0]);
                self.draw_form(frame, chunks[1]);
            }
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(columns[0]);

        let form = &self.session.form;
        let focused = |field: Field| {
            if form.focus == field {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            }
        };

        let cursor = if form.focus == Field::Ticker { "_" } else { "" };
        let ticker = Paragraph::new(format!("{}{cursor}", form.ticker)).block(
            Block::default()
                .title("Enter Stock Ticker (e.g., RELIANCE, AAPL)")
                .borders(Borders::ALL)
                .border_style(focused(Field::Ticker)),
        );
        frame.render_widget(ticker, rows[0]);

        let market = Paragraph::new(format!("< {} >", form.market.display_name())).block(
            Block::default()
                .title("Select Market")
                .borders(Borders::ALL)
                .border_style(focused(Field::Market)),
        );
        frame.render_widget(market, rows[1]);

        let submit_style = if form.focus == Field::Submit {
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let submit = Paragraph::new(Span::styled(" Submit ", submit_style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(focused(Field::Submit)));
        frame.render_widget(submit, rows[2]);

        let hint = Paragraph::new(Text::from(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Enter a ticker and market, then submit to fetch daily prices,",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "render the chart and request an AI analysis.",
                Style::default().fg(Color::Gray),
            )),
        ]));
        frame.render_widget(hint, rows[3]);

        let about = Paragraph::new(Text::from(vec![
            Line::from("This is a stock analysis platform."),
            Line::from(""),
            Line::from(Span::styled(
                format!("Charts are saved under {}", self.config.output_dir.display()),
                Style::default().fg(Color::Gray),
            )),
        ]))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("About").borders(Borders::ALL));
        frame.render_widget(about, columns[1]);
    }

    fn draw_results_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect, out: &AnalysisOutput) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let block = Block::default().title("Chart Analysis").borders(Borders::ALL);
        let inner = block.inner(columns[0]);
        frame.render_widget(block, columns[0]);
        frame.render_widget(Clear, inner);

        match &self.preview {
            Some(data) => frame.render_widget(
                PanelChart {
                    data,
                    style: PanelStyle::terminal(self.chart_text),
                },
                inner,
            ),
            None => frame.render_widget(
                Paragraph::new("No chart preview available.").style(Style::default().fg(Color::Yellow)),
                inner,
            ),
        }

        let text = if out.narrative.is_empty() {
            "(no analysis text returned)".to_string()
        } else {
            out.narrative.text()
        };
        let narrative = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(Block::default().title("Analysis Results").borders(Borders::ALL));
        frame.render_widget(narrative, columns[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.session.screen {
            Screen::Input => "Tab/↑/↓ field  ←/→ market  Enter submit  Esc quit",
            Screen::Results(_) => "↑/↓ scroll  b back  q quit",
        };
        let status = match &self.session.status {
            Status::Idle => Span::raw(""),
            Status::Info(msg) => Span::styled(msg.as_str(), Style::default().fg(Color::Yellow)),
            Status::Error(msg) => Span::styled(msg.as_str(), Style::default().fg(Color::Red)),
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            status,
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_input_header(frame: &mut ratatui::Frame<'_>, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "Stock AI Agent",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Advanced Stock Analysis with AI",
            Style::default().fg(Color::Gray),
        )),
    ];
    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_results_header(frame: &mut ratatui::Frame<'_>, area: Rect, out: &AnalysisOutput) {
    let lines = vec![
        Line::from(Span::styled(
            format!("Analysis for {} ({})", out.run.ticker, out.run.market),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Image: {}", out.run.artifact.path().display()),
            Style::default().fg(Color::Gray),
        )),
    ];
    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}
