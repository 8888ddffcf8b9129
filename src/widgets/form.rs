use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear};

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn render_modal_frame(
    f: &mut ratatui::Frame,
    title: &str,
    percent_x: u16,
    percent_y: u16,
) -> Rect {
    let area = centered_rect(percent_x, percent_y, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title));
    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

fn label_style(focused: bool) -> Style {
    Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray })
}

/// Render a single-line text input with label, a `len/max` counter when bounded,
/// and a red marker when the field has a validation error.
pub fn render_text_input(
    lines: &mut Vec<Line>,
    label: &str,
    value: &str,
    max_len: Option<usize>,
    focused: bool,
    invalid: bool,
) {
    let cursor = if focused { "_" } else { "" };
    let mut spans = vec![
        Span::styled(
            if invalid { "! " } else { "  " },
            Style::default().fg(Color::Red),
        ),
        Span::styled(format!("{:<14}", format!("{}:", label)), label_style(focused)),
        Span::styled(
            value.to_string(),
            Style::default().fg(Color::White).add_modifier(if focused {
                Modifier::BOLD
            } else {
                Modifier::empty()
            }),
        ),
        Span::styled(cursor, Style::default().fg(Color::DarkGray)),
    ];
    if let Some(max) = max_len {
        spans.push(Span::styled(
            format!("  {}/{}", value.chars().count(), max),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.push(Line::from(spans));
}

/// Render a checkbox bound to its checked state.
pub fn render_checkbox(lines: &mut Vec<Line>, label: &str, checked: bool, focused: bool) {
    let mark = if checked { "[x]" } else { "[ ]" };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{} ", mark),
            Style::default().fg(if focused { Color::Yellow } else { Color::White }),
        ),
        Span::styled(label.to_string(), label_style(focused)),
    ]));
}
