use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;
use std::io;
use std::time::Duration;

use crate::config::{default_base_url, parse_base_url, ApiConfig, AppConfig, LogConfig};

enum SetupStep {
    BaseUrl,
    Confirm,
}

struct SetupState {
    step: SetupStep,
    base_url: String,
    error: Option<String>,
}

impl SetupState {
    fn new() -> Self {
        Self {
            step: SetupStep::BaseUrl,
            base_url: default_base_url(),
            error: None,
        }
    }

    /// Advance past the URL step if the typed URL is acceptable.
    fn accept_base_url(&mut self) {
        match parse_base_url(&self.base_url) {
            Ok(url) => {
                self.base_url = url;
                self.error = None;
                self.step = SetupStep::Confirm;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}

pub fn run_setup(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<AppConfig> {
    let mut state = SetupState::new();

    loop {
        terminal.draw(|f| render_setup(f, &state))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match state.step {
                    SetupStep::BaseUrl => match key.code {
                        KeyCode::Enter => state.accept_base_url(),
                        KeyCode::Char(c) => {
                            state.base_url.push(c);
                            state.error = None;
                        }
                        KeyCode::Backspace => {
                            state.base_url.pop();
                            state.error = None;
                        }
                        _ => {}
                    },
                    SetupStep::Confirm => match key.code {
                        KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                            let config = build_config(&state);
                            crate::config::save_config(&config)?;
                            tracing::info!(base_url = %config.api.base_url, "config written");
                            return Ok(config);
                        }
                        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                            state.step = SetupStep::BaseUrl;
                        }
                        _ => {}
                    },
                }
            }
        }
    }
}

fn build_config(state: &SetupState) -> AppConfig {
    AppConfig {
        api: ApiConfig {
            base_url: state.base_url.clone(),
        },
        log: LogConfig::default(),
    }
}

fn render_setup(f: &mut ratatui::Frame, state: &SetupState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(f.area());

    let title = Paragraph::new(" petform: First-Time Setup ")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(title, chunks[0]);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome! Point petform at your pet backend.",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
    ];

    match state.step {
        SetupStep::BaseUrl => {
            lines.push(Line::from(vec![
                Span::styled("API Base URL: ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    &state.base_url,
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("_", Style::default().fg(Color::DarkGray)),
            ]));
            lines.push(Line::from(""));
            if let Some(ref error) = state.error {
                lines.push(Line::from(Span::styled(
                    format!("  {}", error),
                    Style::default().fg(Color::Red),
                )));
            }
            lines.push(Line::from(Span::styled(
                "  (e.g., http://localhost:3000)  Press Enter to continue.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        SetupStep::Confirm => {
            lines.push(Line::from(Span::styled(
                "Configuration Summary:",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("  API:        ", Style::default().fg(Color::DarkGray)),
                Span::raw(&state.base_url),
            ]));

            let path_str = match crate::config::config_path() {
                Ok(p) => p.display().to_string(),
                Err(_) => "~/.config/petform/config.toml".to_string(),
            };
            lines.push(Line::from(vec![
                Span::styled("  Config:     ", Style::default().fg(Color::DarkGray)),
                Span::raw(path_str),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Press Enter or y to save.  Esc or n to start over.",
                Style::default().fg(Color::Yellow),
            )));
        }
    }

    let body = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(body, chunks[1]);
}
