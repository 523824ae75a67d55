use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, EditTarget, Mode};


pub(super) fn start_edit(app: &mut App, target: EditTarget, initial: String) {
    app.edit_cursor = initial.len();
    app.edit_buffer = initial;
    app.edit_target = Some(target);
    app.mode = Mode::Edit;
}

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    let Some(target) = app.edit_target.clone() else {
        app.mode = Mode::Navigate;
        return;
    };

    match key.code {
        KeyCode::Enter => commit_edit(app, &target),
        KeyCode::Esc => {
            // Cell and title edits are already live in the store; deferred
            // targets are simply dropped.
            app.edit_target = None;
            app.edit_buffer.clear();
            app.edit_cursor = 0;
            app.mode = Mode::Navigate;
        }
        KeyCode::Char(c) => {
            app.edit_buffer.insert(app.edit_cursor, c);
            app.edit_cursor += c.len_utf8();
            write_through(app, &target);
        }
        KeyCode::Backspace => {
            if let Some(prev) = prev_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_buffer.remove(prev);
                app.edit_cursor = prev;
                write_through(app, &target);
            }
        }
        KeyCode::Delete => {
            if app.edit_cursor < app.edit_buffer.len() {
                app.edit_buffer.remove(app.edit_cursor);
                write_through(app, &target);
            }
        }
        KeyCode::Left => {
            if let Some(prev) = prev_boundary(&app.edit_buffer, app.edit_cursor) {
                app.edit_cursor = prev;
            }
        }
        KeyCode::Right => {
            app.edit_cursor = next_boundary(&app.edit_buffer, app.edit_cursor);
        }
        KeyCode::Home => app.edit_cursor = 0,
        KeyCode::End => app.edit_cursor = app.edit_buffer.len(),
        _ => {}
    }
}

/// Live targets stream every keystroke into the store; the notifier's
/// throttle keeps listeners at one delivery per frame.
fn write_through(app: &mut App, target: &EditTarget) {
    match target {
        EditTarget::Cell { col, row } => {
            let text = app.edit_buffer.clone();
            app.store.update_sticky_text(*col, *row, &text);
        }
        EditTarget::Title => {
            let title = app.edit_buffer.clone();
            app.store.update_project_title(&title);
        }
        EditTarget::Transition { .. } | EditTarget::SheetName => {}
    }
}

fn commit_edit(app: &mut App, target: &EditTarget) {
    match target {
        // Already written through; Enter just leaves edit mode
        EditTarget::Cell { .. } | EditTarget::Title => {}
        EditTarget::Transition { col } => {
            let label = app.edit_buffer.trim().to_string();
            let value = (!label.is_empty()).then_some(label.as_str());
            app.store.set_transition(*col, value);
        }
        EditTarget::SheetName => {
            let name = app.edit_buffer.clone();
            app.store.rename_sheet(&name);
        }
    }
    app.edit_target = None;
    app.edit_buffer.clear();
    app.edit_cursor = 0;
    app.mode = Mode::Navigate;
}

/// Byte offset of the char boundary before `cursor`, if any
pub(super) fn prev_boundary(s: &str, cursor: usize) -> Option<usize> {
    s[..cursor].char_indices().last().map(|(i, _)| i)
}

/// Byte offset of the char boundary after `cursor` (or the end)
pub(super) fn next_boundary(s: &str, cursor: usize) -> usize {
    s[cursor..]
        .chars()
        .next()
        .map(|c| cursor + c.len_utf8())
        .unwrap_or(cursor)
}
