use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use indexmap::IndexMap;

use crate::model::{ROW_COUNT, Row, Slot};
use crate::store::derive;
use crate::tui::app::{App, EditTarget, Mode};
use crate::util::text::{truncate_to_width, wrap_text};

use super::caret_line;

const CELL_WIDTH: u16 = 26;
const CELL_INNER: usize = 24;
const CONNECTOR_WIDTH: u16 = 7;
const GUTTER_WIDTH: u16 = 10;

/// Render the SIPOC grid: one bordered cell per visible column and row, a
/// connector lane between adjacent visible columns, and a row-label gutter.
/// Heights are derived from content every frame, so all cells of a row stay
/// the same height no matter which column wrapped deepest.
pub fn render_board(frame: &mut Frame, app: &mut App, area: Rect) {
    let visible = app.visible_cols();
    if visible.is_empty() {
        let hint = Paragraph::new("all steps are hidden on this sheet; press V to show them")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(hint, area);
        return;
    }

    // Horizontal scroll: keep the cursor column inside the window
    let per = (CELL_WIDTH + CONNECTOR_WIDTH) as usize;
    let usable = area.width.saturating_sub(GUTTER_WIDTH) as usize + CONNECTOR_WIDTH as usize;
    let fit = (usable / per).max(1);
    let cursor_pos = visible
        .iter()
        .position(|&i| i == app.cursor_col)
        .unwrap_or(0);
    let mut scroll = app.scroll_col.min(visible.len() - 1);
    if cursor_pos < scroll {
        scroll = cursor_pos;
    }
    if cursor_pos >= scroll + fit {
        scroll = cursor_pos + 1 - fit;
    }
    app.scroll_col = scroll;
    let window: Vec<usize> = visible[scroll..(scroll + fit).min(visible.len())].to_vec();

    let editing_cell = match (&app.mode, &app.edit_target) {
        (Mode::Edit, Some(EditTarget::Cell { col, row })) => Some((*col, *row)),
        _ => None,
    };

    let project = app.store.project();
    let sheet = project.active_sheet();
    let ids = derive::assign_ids(project);
    let outputs = derive::all_outputs(project);

    // Uniform per-row heights over the visible window
    let mut heights = [0u16; ROW_COUNT];
    for row in Row::ALL {
        let mut content = 3usize;
        for &col in &window {
            let slot = sheet.columns[col].slot(row);
            let (text, _) = cell_text(app, col, row, slot, &outputs, editing_cell);
            content = content.max(wrap_text(&text, CELL_INNER).len().max(2) + 1);
        }
        heights[row.index()] = content as u16 + 2;
    }

    // Row-label gutter
    let mut y = area.y;
    for row in Row::ALL {
        let rect = Rect::new(area.x, y + 1, GUTTER_WIDTH.saturating_sub(1), 1).intersection(area);
        if rect.height > 0 {
            let label = Paragraph::new(row.label())
                .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
            frame.render_widget(label, rect);
        }
        y += heights[row.index()];
    }

    // Cells and connectors
    for (wi, &col) in window.iter().enumerate() {
        let x = area.x + GUTTER_WIDTH + (wi as u16) * (CELL_WIDTH + CONNECTOR_WIDTH);
        let mut y = area.y;

        for row in Row::ALL {
            let height = heights[row.index()];
            let rect = Rect::new(x, y, CELL_WIDTH, height).intersection(area);
            y += height;
            if rect.height == 0 || rect.width == 0 {
                continue;
            }

            let slot = sheet.columns[col].slot(row);
            let (text, linked) = cell_text(app, col, row, slot, &outputs, editing_cell);
            let is_cursor = col == app.cursor_col && row == app.cursor_row;
            let is_editing = editing_cell == Some((col, row));

            let border_color = if is_editing {
                app.theme.highlight
            } else if is_cursor {
                app.theme.selection_border
            } else {
                app.theme.dim
            };
            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color).bg(app.theme.background))
                .style(Style::default().bg(app.theme.background));
            if row == Row::Supplier {
                let marker = if sheet.columns[col].is_parallel {
                    format!(" {} \u{2225} ", wi + scroll + 1)
                } else {
                    format!(" {} ", wi + scroll + 1)
                };
                block = block.title(Span::styled(
                    marker,
                    Style::default().fg(app.theme.purple).bg(app.theme.background),
                ));
            }

            let mut lines = vec![badge_line(app, col, row, slot, &ids)];
            let text_color = if linked { app.theme.cyan } else { app.theme.text };
            for wrapped in wrap_text(&text, CELL_INNER) {
                lines.push(Line::from(Span::styled(
                    wrapped,
                    Style::default().fg(text_color).bg(app.theme.background),
                )));
            }

            frame.render_widget(Paragraph::new(lines).block(block), rect);
        }

        // Connector lane toward the next visible column, aligned with the
        // Process row
        if wi + 1 < window.len() {
            let next = window[wi + 1];
            let pad = heights[0] + heights[1] + heights[2];
            let cx = x + CELL_WIDTH;
            let rect = Rect::new(cx, area.y, CONNECTOR_WIDTH, pad + 3).intersection(area);
            if rect.height == 0 {
                continue;
            }

            let mut lines: Vec<Line> = vec![Line::default(); pad as usize];
            let w = CONNECTOR_WIDTH as usize;
            if sheet.columns[next].is_parallel {
                lines.push(Line::from(Span::styled(
                    format!("{:^w$}", "\u{2225}"),
                    Style::default()
                        .fg(app.theme.purple)
                        .bg(app.theme.background)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                let label = sheet.columns[col].transition_next.trim();
                if label.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("{:^w$}", "+"),
                        Style::default().fg(app.theme.dim).bg(app.theme.background),
                    )));
                } else {
                    lines.push(Line::from(Span::styled(
                        truncate_to_width(label, w),
                        Style::default().fg(app.theme.cyan).bg(app.theme.background),
                    )));
                }
            }
            lines.push(Line::from(Span::styled(
                format!("{}\u{25B6}", "\u{2500}".repeat(w - 1)),
                Style::default().fg(app.theme.dim).bg(app.theme.background),
            )));

            frame.render_widget(
                Paragraph::new(lines).style(Style::default().bg(app.theme.background)),
                rect,
            );
        }
    }
}

/// Text a cell renders: the live edit buffer for the cell being edited,
/// otherwise the derived display text (linked inputs mirror their source).
fn cell_text(
    app: &App,
    col: usize,
    row: Row,
    slot: &Slot,
    outputs: &IndexMap<String, String>,
    editing_cell: Option<(usize, Row)>,
) -> (String, bool) {
    if editing_cell == Some((col, row)) {
        return (caret_line(&app.edit_buffer, app.edit_cursor), false);
    }
    derive::display_text(slot, row, outputs)
}

/// First content line of a cell: id tag, score badges and process markers
fn badge_line(
    app: &App,
    col: usize,
    row: Row,
    slot: &Slot,
    ids: &[Option<derive::ColumnIds>],
) -> Line<'static> {
    let bg = app.theme.background;
    let config = app.store.config();
    let mut spans: Vec<Span> = Vec::new();

    match row {
        Row::Input | Row::Output => {
            let col_ids = ids.get(col).and_then(|c| c.as_ref());
            let tag = match row {
                Row::Input => col_ids.and_then(|c| {
                    c.input.as_ref().map(|id| {
                        if c.input_linked {
                            format!("[{}\u{2192}]", id)
                        } else {
                            format!("[{}]", id)
                        }
                    })
                }),
                _ => col_ids.and_then(|c| c.output.as_ref().map(|id| format!("[{}]", id))),
            };
            if let Some(tag) = tag {
                spans.push(Span::styled(
                    tag,
                    Style::default().fg(app.theme.blue).bg(bg),
                ));
                spans.push(Span::styled(" ", Style::default().bg(bg)));
            }
            if let Some(score) = derive::qa_score(&slot.qa, config) {
                let color = app.theme.tier_color(derive::score_tier(score));
                spans.push(Span::styled(
                    format!("Q:{}%", score),
                    Style::default().fg(color).bg(bg),
                ));
            }
        }
        Row::System => {
            if let Some(score) = slot.system_data.calculated_score {
                let color = app.theme.tier_color(derive::score_tier(score));
                spans.push(Span::styled(
                    format!("Sys:{}%", score),
                    Style::default().fg(color).bg(bg),
                ));
            }
        }
        Row::Process => {
            if let Some(kind) = slot.kind {
                spans.push(Span::styled(
                    format!("{} ", kind.icon()),
                    Style::default().fg(app.theme.text).bg(bg),
                ));
            }
            if let Some(value) = slot.process_value {
                spans.push(Span::styled(
                    format!("{:?} ", value),
                    Style::default().fg(app.theme.blue).bg(bg),
                ));
            }
            if let Some(status) = slot.process_status {
                spans.push(Span::styled(
                    status.face().to_string(),
                    Style::default().fg(app.theme.status_color(status)).bg(bg),
                ));
            }
        }
        Row::Supplier | Row::Customer => {}
    }

    Line::from(spans)
}
