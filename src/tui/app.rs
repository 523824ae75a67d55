use std::cell::Cell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::storage::{self, LoadOutcome, StorageError};
use crate::io::{Severity, StatusSink};
use crate::model::{BoardConfig, ProcessStatus, Project, Row, Slot};
use crate::store::Store;

use super::input;
use super::render;
use super::theme::Theme;

/// Save no more often than this while typing
const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(1);

/// Status messages fade after this long
pub const STATUS_TTL: Duration = Duration::from_secs(4);

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Edit,
    Modal,
    Confirm,
}

/// What the single-line edit buffer is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// Board cell text; keystrokes write through to the store
    Cell { col: usize, row: Row },
    /// Project title; keystrokes write through to the store
    Title,
    /// Transition label between a column and the next; committed on Enter
    Transition { col: usize },
    /// Active sheet name; committed on Enter
    SheetName,
}

/// Pending destructive action awaiting y/n
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteColumn(usize),
    DeleteSheet,
}

impl ConfirmAction {
    pub fn prompt(self) -> &'static str {
        match self {
            ConfirmAction::DeleteColumn(_) => "Delete this process step and all its data?",
            ConfirmAction::DeleteSheet => "Delete this sheet and all its columns?",
        }
    }
}

/// In-progress text edit of one detail-editor field
#[derive(Debug, Clone)]
pub struct FieldEdit {
    pub buffer: String,
    /// Byte offset into buffer
    pub cursor: usize,
}

/// State of the cell detail editor popup
#[derive(Debug, Clone)]
pub struct ModalState {
    pub col: usize,
    pub row: Row,
    /// Working copy; committed as a patch on save, dropped on cancel
    pub scratch: Slot,
    /// Index into `tab_labels()`
    pub tab: usize,
    /// Cursor over the current tab's field list
    pub cursor: usize,
    pub scroll: usize,
    pub field_edit: Option<FieldEdit>,
    /// Link choices for Input rows: (OUT id, source text), all sheets
    pub outputs: Vec<(String, String)>,
}

impl ModalState {
    /// The analysis sections only apply to steps marked not-in-control, so
    /// the tab set follows the scratch status as it is edited.
    pub fn tab_labels(&self) -> &'static [&'static str] {
        match self.row {
            Row::Process => match self.scratch.process_status {
                Some(ProcessStatus::Sad) | Some(ProcessStatus::Neutral) => {
                    &["Step", "Analysis", "Disruptions"]
                }
                Some(ProcessStatus::Happy) | None => &["Step"],
            },
            Row::System => &["System fit"],
            _ => &["Definitions", "Quality"],
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
    pub at: Instant,
}

/// Main application state
pub struct App {
    pub store: Store,
    pub file: PathBuf,
    pub theme: Theme,
    pub mode: Mode,
    pub should_quit: bool,
    /// Cursor column (index into the active sheet's columns; always visible)
    pub cursor_col: usize,
    pub cursor_row: Row,
    /// First visible-column slot shown by the board (horizontal scroll)
    pub scroll_col: usize,
    pub edit_target: Option<EditTarget>,
    pub edit_buffer: String,
    /// Byte offset into edit_buffer
    pub edit_cursor: usize,
    pub modal: Option<ModalState>,
    pub confirm: Option<ConfirmAction>,
    pub message: Option<StatusMessage>,
    dirty: Rc<Cell<bool>>,
    last_save: Instant,
}

impl App {
    pub fn new(mut store: Store, file: PathBuf) -> Self {
        let theme = Theme::from_config(&store.config().ui);

        // Any committed change marks the project for autosave
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        store.subscribe(Box::new(move |_, _| flag.set(true)));

        App {
            store,
            file,
            theme,
            mode: Mode::Navigate,
            should_quit: false,
            cursor_col: 0,
            cursor_row: Row::Process,
            scroll_col: 0,
            edit_target: None,
            edit_buffer: String::new(),
            edit_cursor: 0,
            modal: None,
            confirm: None,
            message: None,
            dirty,
            last_save: Instant::now(),
        }
    }

    pub fn project(&self) -> &Project {
        self.store.project()
    }

    /// Indices of the active sheet's visible columns, board order
    pub fn visible_cols(&self) -> Vec<usize> {
        self.project()
            .active_sheet()
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_visible)
            .map(|(i, _)| i)
            .collect()
    }

    /// Clamp the cursor onto a visible column after structural changes
    pub fn fix_cursor(&mut self) {
        let visible = self.visible_cols();
        if visible.is_empty() {
            self.cursor_col = 0;
            self.scroll_col = 0;
            return;
        }
        if !visible.contains(&self.cursor_col) {
            let pos = visible.partition_point(|&i| i < self.cursor_col);
            self.cursor_col = visible[pos.min(visible.len() - 1)];
        }
        if self.scroll_col >= visible.len() {
            self.scroll_col = visible.len() - 1;
        }
    }

    /// The status message still worth showing, if any
    pub fn live_message(&self) -> Option<&StatusMessage> {
        self.message
            .as_ref()
            .filter(|m| m.at.elapsed() < STATUS_TTL)
    }

    /// Write the project to disk, surfacing failures in the status row
    pub fn save_project(&mut self) {
        let mut project = self.store.project().clone();
        match storage::save(&self.file, &mut project) {
            Ok(()) => {
                self.dirty.set(false);
                self.last_save = Instant::now();
            }
            Err(StorageError::Quota { .. }) => self.status(
                "disk full; export your work (sipoc export-json) and free space",
                Severity::Error,
            ),
            Err(e) => self.status(&format!("save failed: {}", e), Severity::Error),
        }
    }

    fn autosave_due(&self) -> bool {
        self.dirty.get() && self.last_save.elapsed() >= AUTOSAVE_INTERVAL
    }
}

impl StatusSink for App {
    fn status(&mut self, message: &str, severity: Severity) {
        self.message = Some(StatusMessage {
            text: message.to_string(),
            severity,
            at: Instant::now(),
        });
    }
}

/// Run the TUI application
pub fn run(file: &Path, config: BoardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (project, outcome) = storage::load_or_default(file, &config);
    let store = Store::with_project(project, config);
    let mut app = App::new(store, file.to_path_buf());
    if let LoadOutcome::CorruptFallback = outcome {
        app.status(
            "project file could not be parsed; starting fresh (old file kept until next save)",
            Severity::Warning,
        );
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Final save before leaving the alternate screen
    app.save_project();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Deliver coalesced throttled changes exactly once per frame
        app.store.flush();

        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.autosave_due() {
            app.save_project();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
