use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::store::derive;
use crate::tui::app::{App, Mode};

/// Render the status row (bottom of screen): transient messages or key
/// hints on the left, board health on the right.
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans: Vec<Span> = Vec::new();
    if let Some(message) = app.live_message() {
        spans.push(Span::styled(
            format!(" {}", message.text),
            Style::default()
                .fg(app.theme.severity_color(message.severity))
                .bg(bg),
        ));
    } else {
        let hint = match app.mode {
            Mode::Navigate => {
                " arrows move  i edit  o details  t transition  Tab sheets  u undo  q quit"
            }
            Mode::Edit => " Enter done  Esc close",
            Mode::Modal => " Tab sections  Enter edit/cycle  ^D remove row  S apply  s save  Esc discard",
            Mode::Confirm => " y confirm  n cancel",
        };
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    // Right side: control-status tallies plus sheet position
    let tallies = derive::status_tallies(app.project().active_sheet());
    let sheets = format!(
        "sheet {}/{}",
        app.project().active_sheet_index() + 1,
        app.project().sheets.len()
    );
    let right = [
        (format!("\u{1F642}{}", tallies.happy), app.theme.green),
        (format!(" \u{1F610}{}", tallies.neutral), app.theme.yellow),
        (format!(" \u{2639}{}", tallies.sad), app.theme.red),
        (format!("  {} ", sheets), app.theme.dim),
    ];

    let left_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let right_width: usize = right.iter().map(|(s, _)| s.chars().count()).sum();
    if left_width + right_width < width {
        spans.push(Span::styled(
            " ".repeat(width - left_width - right_width),
            Style::default().bg(bg),
        ));
        for (text, color) in right {
            spans.push(Span::styled(text, Style::default().fg(color).bg(bg)));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
