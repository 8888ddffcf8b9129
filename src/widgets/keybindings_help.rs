use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::form::centered_rect;

fn heading(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

pub fn render(f: &mut ratatui::Frame) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Keybindings ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        heading("Pet List"),
        Line::from("  j / k or Up / Down: move selection"),
        Line::from("  n: add a pet"),
        Line::from("  Enter or e: edit selected pet"),
        Line::from("  r: refresh pets"),
        Line::from("  q: quit"),
        Line::from(""),
        heading("Pet Form"),
        Line::from("  Tab / Down: next field"),
        Line::from("  Shift+Tab / Up: previous field"),
        Line::from("  Space: toggle Potty Trained (when focused)"),
        Line::from("  Backspace: delete character"),
        Line::from("  Diet, Likes, Dislikes: separate items with commas"),
        Line::from("  Enter: submit"),
        Line::from("  Esc: cancel and return to the list"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let body = Paragraph::new(lines).block(Block::default());
    f.render_widget(body, inner);
}
