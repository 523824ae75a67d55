use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::util::text::wrap_text;

use super::centered_rect_fixed;

/// Render the yes/no popup for destructive actions
pub fn render_confirm_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(action) = app.confirm else {
        return;
    };

    let popup_w: u16 = 44.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(4) as usize;

    let bg = app.theme.background;
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let mut lines: Vec<Line> = Vec::new();

    for wrapped in wrap_text(action.prompt(), inner_w) {
        lines.push(Line::from(Span::styled(format!(" {}", wrapped), text_style)));
    }
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled(
            " y",
            Style::default()
                .fg(app.theme.red)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" delete   ", text_style),
        Span::styled(
            "n",
            Style::default()
                .fg(app.theme.green)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" keep", text_style),
    ]));

    let popup_h = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let overlay = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.red).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), overlay);
}
