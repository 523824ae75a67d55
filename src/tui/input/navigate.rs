use crossterm::event::{KeyCode, KeyEvent};

use crate::io::Severity;
use crate::io::StatusSink;
use crate::model::Row;
use crate::tui::app::{App, ConfirmAction, EditTarget, Mode};

use super::*;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Cursor movement over the visible grid
        KeyCode::Left | KeyCode::Char('h') => move_cursor_col(app, -1),
        KeyCode::Right | KeyCode::Char('l') => move_cursor_col(app, 1),
        KeyCode::Up | KeyCode::Char('k') => move_cursor_row(app, -1),
        KeyCode::Down | KeyCode::Char('j') => move_cursor_row(app, 1),

        // Editors
        KeyCode::Enter | KeyCode::Char('i') => start_cell_edit(app),
        KeyCode::Char('o') | KeyCode::Char(' ') => {
            if app.cursor_row.has_details() {
                open_modal(app, app.cursor_col, app.cursor_row);
            } else {
                app.status(
                    &format!("{} cells hold plain text only", app.cursor_row.label()),
                    Severity::Info,
                );
            }
        }
        KeyCode::Char('T') => {
            let title = app.project().title.clone();
            start_edit(app, EditTarget::Title, title);
        }
        KeyCode::Char('t') => {
            let col = app.cursor_col;
            let label = app
                .project()
                .active_sheet()
                .columns
                .get(col)
                .map(|c| c.transition_next.clone())
                .unwrap_or_default();
            start_edit(app, EditTarget::Transition { col }, label);
        }
        KeyCode::Char('r') => {
            let name = app.project().active_sheet().name.clone();
            start_edit(app, EditTarget::SheetName, name);
        }

        // Sheets
        KeyCode::Tab => switch_sheet(app, 1),
        KeyCode::BackTab => switch_sheet(app, -1),
        KeyCode::Char('n') => {
            app.store.add_sheet(None);
            app.cursor_col = 0;
            app.scroll_col = 0;
            app.cursor_row = Row::Process;
        }
        KeyCode::Char('D') => {
            app.confirm = Some(ConfirmAction::DeleteSheet);
            app.mode = Mode::Confirm;
        }

        // Columns
        KeyCode::Char('a') => {
            app.store.add_column(Some(app.cursor_col));
            app.cursor_col += 1;
            app.fix_cursor();
        }
        KeyCode::Char('d') => {
            app.confirm = Some(ConfirmAction::DeleteColumn(app.cursor_col));
            app.mode = Mode::Confirm;
        }
        KeyCode::Char('H') => move_column(app, -1),
        KeyCode::Char('L') => move_column(app, 1),
        KeyCode::Char('p') => app.store.toggle_parallel(app.cursor_col),
        KeyCode::Char('v') => {
            if app.visible_cols().len() > 1 {
                app.store.set_col_visibility(app.cursor_col, false);
                app.fix_cursor();
            } else {
                app.status("at least one step must stay visible", Severity::Warning);
            }
        }
        KeyCode::Char('V') => {
            let hidden: Vec<usize> = app
                .project()
                .active_sheet()
                .columns
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.is_visible)
                .map(|(i, _)| i)
                .collect();
            if hidden.is_empty() {
                app.status("no hidden steps on this sheet", Severity::Info);
            } else {
                app.store.begin_batch();
                for index in hidden {
                    app.store.set_col_visibility(index, true);
                }
                app.store.end_batch();
            }
        }

        // Undo / redo / save
        KeyCode::Char('u') => {
            if app.store.undo() {
                app.fix_cursor();
            } else {
                app.status("nothing to undo", Severity::Info);
            }
        }
        KeyCode::Char('U') => {
            if app.store.redo() {
                app.fix_cursor();
            } else {
                app.status("nothing to redo", Severity::Info);
            }
        }
        KeyCode::Char('s') => {
            app.save_project();
            if app.live_message().is_none() {
                app.status("saved", Severity::Success);
            }
        }
        _ => {}
    }
}

fn move_cursor_col(app: &mut App, direction: isize) {
    let visible = app.visible_cols();
    let Some(pos) = visible.iter().position(|&i| i == app.cursor_col) else {
        app.fix_cursor();
        return;
    };
    if let Some(next) = pos.checked_add_signed(direction)
        && next < visible.len()
    {
        app.cursor_col = visible[next];
    }
}

fn move_cursor_row(app: &mut App, direction: isize) {
    let idx = app.cursor_row.index();
    if let Some(next) = idx.checked_add_signed(direction)
        && let Some(row) = Row::from_index(next)
    {
        app.cursor_row = row;
    }
}

fn move_column(app: &mut App, direction: isize) {
    let col = app.cursor_col;
    let count = app.project().active_sheet().columns.len();
    if let Some(target) = col.checked_add_signed(direction)
        && target < count
    {
        app.store.move_column(col, direction);
        app.cursor_col = target;
        app.fix_cursor();
    }
}

pub(super) fn switch_sheet(app: &mut App, direction: isize) {
    let project = app.project();
    let count = project.sheets.len();
    if count < 2 {
        return;
    }
    let current = project.active_sheet_index() as isize;
    let next = (current + direction).rem_euclid(count as isize) as usize;
    let id = project.sheets[next].id.clone();
    app.store.set_active_sheet(&id);
    app.cursor_col = 0;
    app.scroll_col = 0;
    app.fix_cursor();
}

fn start_cell_edit(app: &mut App) {
    let col = app.cursor_col;
    let row = app.cursor_row;
    let Some(column) = app.project().active_sheet().columns.get(col) else {
        return;
    };
    let slot = column.slot(row);
    let link = slot.linked_source_id.clone();
    let text = slot.text.clone();
    if row == Row::Input
        && let Some(link) = link
        && app.store.all_outputs().contains_key(&link)
    {
        app.status(
            &format!("this input mirrors {}; edit the source output instead", link),
            Severity::Warning,
        );
        return;
    }
    start_edit(app, EditTarget::Cell { col, row }, text);
}
