pub mod board;
pub mod confirm_popup;
pub mod modal;
pub mod status_row;
pub mod tab_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::tui::app::{App, EditTarget, Mode};
use crate::util::text::truncate_to_width;

/// Main render function; dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: title | tab bar + separator | board | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_title_row(frame, app, chunks[0]);
    tab_bar::render_tab_bar(frame, app, chunks[1]);
    board::render_board(frame, app, chunks[2]);
    status_row::render_status_row(frame, app, chunks[3]);

    // Overlays
    if app.modal.is_some() {
        modal::render_modal(frame, app, area);
    }
    if app.confirm.is_some() {
        confirm_popup::render_confirm_popup(frame, app, area);
    }
}

fn render_title_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let editing_title = app.mode == Mode::Edit && app.edit_target == Some(EditTarget::Title);
    let title = if editing_title {
        caret_line(&app.edit_buffer, app.edit_cursor)
    } else {
        app.project().title.clone()
    };

    let title_style = if editing_title {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(app.theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    };

    let mut spans = vec![
        Span::styled(" \u{25A6} ", Style::default().fg(app.theme.purple).bg(bg)),
        Span::styled(
            truncate_to_width(&title, width.saturating_sub(4)),
            title_style,
        ),
    ];

    let file = app.file.display().to_string();
    let content_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let file_width = file.chars().count();
    if content_width + file_width + 1 < width {
        let padding = width - content_width - file_width - 1;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(file, Style::default().fg(app.theme.dim).bg(bg)));
        spans.push(Span::styled(" ", Style::default().bg(bg)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg)),
        area,
    );
}

/// Buffer text with a block caret inserted at the byte cursor
pub(super) fn caret_line(buffer: &str, cursor: usize) -> String {
    let cursor = cursor.min(buffer.len());
    format!("{}\u{258C}{}", &buffer[..cursor], &buffer[cursor..])
}

pub(super) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(
        x,
        y,
        width.min(area.width),
        height.min(area.height),
    )
}
