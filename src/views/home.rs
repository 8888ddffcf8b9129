use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;
use crate::pet::PetRecord;

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let t: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", t)
    } else {
        s.to_string()
    }
}

fn pet_row(record: &PetRecord) -> String {
    let age = record
        .age
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string());
    let trained = if record.poddy_trained { "yes" } else { "no" };
    format!(
        "{:<20} | {:<16} | {:<20} | {:>3} | {:<7}",
        truncate(&record.name, 20),
        truncate(&record.species, 16),
        truncate(&record.owner_name, 20),
        age,
        trained
    )
}

pub fn render(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let heading_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD);
    let pets = app.cache.pets();

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!(
            "  {:<20} | {:<16} | {:<20} | {:>3} | {:<7}",
            "NAME", "SPECIES", "OWNER", "AGE", "TRAINED"
        ),
        heading_style,
    )));
    lines.push(Line::from(Span::styled(
        "-".repeat(80),
        Style::default().fg(Color::DarkGray),
    )));

    if app.cache.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No pets yet. Press n to add one.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (idx, (_, record)) in pets.iter().enumerate() {
        let is_selected = idx == app.selected_index;
        let prefix = if is_selected { "> " } else { "  " };
        let style = if is_selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}", prefix, pet_row(record)),
            style,
        )));
    }

    // Keep the selected row on screen.
    let visible_rows = area.height.saturating_sub(2) as usize;
    let selected_line = app.selected_index + 2;
    let scroll = selected_line.saturating_sub(visible_rows.saturating_sub(1)) as u16;

    let title = format!(" Pets ({}) ", pets.len());
    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll, 0));
    f.render_widget(body, area);
}
