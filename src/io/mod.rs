pub mod export;
pub mod storage;

/// Severity of a fire-and-forget status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Best-effort message sink (the TUI status row, stderr for the CLI).
/// Absence or failure of the sink never blocks an operation.
pub trait StatusSink {
    fn status(&mut self, message: &str, severity: Severity);
}
