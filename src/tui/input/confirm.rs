use crossterm::event::{KeyCode, KeyEvent};

use crate::io::Severity;
use crate::io::StatusSink;
use crate::tui::app::{App, ConfirmAction, Mode};


pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    let Some(action) = app.confirm else {
        app.mode = Mode::Navigate;
        return;
    };

    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            let result = match action {
                ConfirmAction::DeleteColumn(index) => app.store.delete_column(index),
                ConfirmAction::DeleteSheet => app.store.delete_sheet(),
            };
            if let Err(refusal) = result {
                app.status(&refusal.to_string(), Severity::Warning);
            }
            app.fix_cursor();
            app.confirm = None;
            app.mode = Mode::Navigate;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm = None;
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}
