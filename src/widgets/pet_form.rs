use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::form;
use crate::app::{App, FormController};
use crate::pet::PetField;

pub fn render(f: &mut ratatui::Frame, app: &App) {
    let state = match &app.form {
        Some(s) => s,
        None => return,
    };

    let inner = form::render_modal_frame(f, state.title(), 70, 80);
    let body = Paragraph::new(form_lines(state)).wrap(Wrap { trim: false });
    f.render_widget(body, inner);
}

/// Lines of the form body: fields, submit hint, failure message, then validation messages.
pub fn form_lines(state: &FormController) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));

    for field in PetField::all() {
        let focused = state.focused == *field;
        if field.is_checkbox() {
            form::render_checkbox(&mut lines, field.label(), state.form.poddy_trained, focused);
        } else {
            form::render_text_input(
                &mut lines,
                field.label(),
                &state.display_text(*field),
                field.max_len(),
                focused,
                state.errors.contains_key(field),
            );
        }
    }

    lines.push(Line::from(""));
    let submit_label = if state.is_submitting() {
        "  Submitting..."
    } else {
        "  [Enter] Submit"
    };
    lines.push(Line::from(Span::styled(
        submit_label,
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    if !state.message.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", state.message),
            Style::default().fg(Color::Red),
        )));
    }

    for message in state.errors.values() {
        lines.push(Line::from(Span::styled(
            format!("  • {}", message),
            Style::default().fg(Color::Red),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Tab/Up/Down] field  [Space] toggle  [Enter] submit  [Esc] cancel",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}
