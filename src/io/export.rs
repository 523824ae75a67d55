use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::model::{BoardConfig, Project, Row};
use crate::store::derive;
use crate::util::text::{display_width, wrap_text};

/// Error type for file exchange. Import failures never partially overwrite
/// state; the caller only swaps the project in on `Ok`.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("could not write {path}: {source}")]
    WriteError {
        path: String,
        source: std::io::Error,
    },
    #[error("could not read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid project file: not JSON ({0})")]
    NotJson(serde_json::Error),
    #[error("invalid project file: no sheets found")]
    NoSheets,
    #[error("could not serialize project: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Pretty-printed JSON document of the whole project.
pub fn to_json(project: &Project) -> Result<String, ExchangeError> {
    Ok(serde_json::to_string_pretty(project)?)
}

pub fn write_json(path: &Path, project: &Project) -> Result<(), ExchangeError> {
    let json = to_json(project)?;
    fs::write(path, json).map_err(|source| ExchangeError::WriteError {
        path: path.display().to_string(),
        source,
    })
}

/// Parse a user-supplied document and return a sanitized project.
/// Rejects anything without a non-empty `sheets` array, with a descriptive
/// error and no state touched.
pub fn import_json(text: &str, config: &BoardConfig) -> Result<Project, ExchangeError> {
    let value: Value = serde_json::from_str(text).map_err(ExchangeError::NotJson)?;
    let has_sheets = value
        .get("sheets")
        .and_then(|s| s.as_array())
        .is_some_and(|a| !a.is_empty());
    if !has_sheets {
        return Err(ExchangeError::NoSheets);
    }
    Ok(super::storage::sanitize(value, config))
}

pub fn read_project_file(path: &Path, config: &BoardConfig) -> Result<Project, ExchangeError> {
    let text = fs::read_to_string(path).map_err(|source| ExchangeError::ReadError {
        path: path.display().to_string(),
        source,
    })?;
    import_json(&text, config)
}

// --- CSV export ------------------------------------------------------------

const CSV_HEADERS: [&str; 13] = [
    "Sheet",
    "Column",
    "Input ID",
    "Output ID",
    "Row",
    "Text",
    "Type",
    "Status",
    "Lean Value",
    "System Score",
    "QA",
    "Root Causes",
    "Countermeasures",
];

/// Quote a field only when it would break the delimiter: newlines are
/// flattened to spaces so spreadsheet rows stay one line.
fn csv_field(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.contains(';') || flat.contains('"') {
        format!("\"{}\"", flat.replace('"', "\"\""))
    } else {
        flat
    }
}

/// Semicolon-delimited export: one line per slot across every sheet, column
/// and row, with IN/OUT ids numbered continuously across sheets (visibility
/// ignored, matching the exchange format rather than the board view).
pub fn to_csv(project: &Project) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADERS.join(";"));
    out.push('\n');

    let mut global_in = 0;
    let mut global_out = 0;

    for sheet in &project.sheets {
        for (col_idx, column) in sheet.columns.iter().enumerate() {
            let mut in_id = String::new();
            let mut out_id = String::new();
            if column.slot(Row::Input).has_text() {
                global_in += 1;
                in_id = format!("IN{global_in}");
            }
            if column.slot(Row::Output).has_text() {
                global_out += 1;
                out_id = format!("OUT{global_out}");
            }

            for row in Row::ALL {
                let slot = column.slot(row);
                let sys_score = match (row, slot.system_data.calculated_score) {
                    (Row::System, Some(score)) => score.to_string(),
                    _ => String::new(),
                };
                let qa = if matches!(row, Row::Input | Row::Output) {
                    slot.qa
                        .iter()
                        .filter_map(|(key, entry)| {
                            let result = entry.result?;
                            let label = match result {
                                crate::model::QaResult::Ok => "OK",
                                crate::model::QaResult::NotOk => "NOT_OK",
                                crate::model::QaResult::NotApplicable => "NA",
                            };
                            Some(format!("{key}: {label}"))
                        })
                        .collect::<Vec<_>>()
                        .join(" | ")
                } else {
                    String::new()
                };

                let fields = [
                    sheet.name.clone(),
                    (col_idx + 1).to_string(),
                    if row == Row::Input { in_id.clone() } else { String::new() },
                    if row == Row::Output { out_id.clone() } else { String::new() },
                    row.label().to_string(),
                    slot.text.clone(),
                    slot.kind.map(|k| k.label().to_string()).unwrap_or_default(),
                    slot.process_status
                        .filter(|_| row == Row::Process)
                        .map(|s| s.label().to_string())
                        .unwrap_or_default(),
                    slot.process_value
                        .filter(|_| row == Row::Process)
                        .map(|v| v.label().to_string())
                        .unwrap_or_default(),
                    sys_score,
                    qa,
                    slot.causes.join(" | "),
                    slot.improvements.join(" | "),
                ];
                let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
                out.push_str(&line.join(";"));
                out.push('\n');
            }
        }
    }
    out
}

/// Write the CSV with a UTF-8 BOM for spreadsheet compatibility.
pub fn write_csv(path: &Path, project: &Project) -> Result<(), ExchangeError> {
    let body = format!("\u{FEFF}{}", to_csv(project));
    fs::write(path, body).map_err(|source| ExchangeError::WriteError {
        path: path.display().to_string(),
        source,
    })
}

// --- Plain-text board snapshot ---------------------------------------------

const SNAPSHOT_CELL_WIDTH: usize = 24;

/// Render the active sheet as a plain-text board: the capture collaborator,
/// with all editing chrome (action buttons, drag handles) absent by
/// construction. Hidden columns are skipped; row heights are uniform per
/// row; connectors show parallel markers or transition labels.
pub fn to_text_snapshot(project: &Project, config: &BoardConfig) -> String {
    let sheet = project.active_sheet();
    let ids = derive::assign_ids(project);
    let outputs = derive::all_outputs(project);

    let visible: Vec<usize> = sheet
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_visible)
        .map(|(i, _)| i)
        .collect();

    let mut out = format!("{} — {}\n\n", project.title, sheet.name);
    if visible.is_empty() {
        return out;
    }

    for row in Row::ALL {
        // Wrap every visible cell, then pad to the tallest for this row.
        let mut cells: Vec<Vec<String>> = Vec::new();
        for &col_idx in &visible {
            let column = &sheet.columns[col_idx];
            let slot = column.slot(row);
            let (text, linked) = derive::display_text(slot, row, &outputs);
            let mut lines = wrap_text(&text, SNAPSHOT_CELL_WIDTH);
            let mut tags: Vec<String> = Vec::new();
            if let Some(Some(col_ids)) = ids.get(col_idx) {
                match row {
                    Row::Input => {
                        if let Some(id) = &col_ids.input {
                            tags.push(if linked { format!("[{id} ⇒]") } else { format!("[{id}]") });
                        }
                    }
                    Row::Output => {
                        if let Some(id) = &col_ids.output {
                            tags.push(format!("[{id}]"));
                        }
                    }
                    _ => {}
                }
            }
            if matches!(row, Row::Input | Row::Output)
                && let Some(score) = derive::qa_score(&slot.qa, config)
            {
                tags.push(format!("Q:{score}%"));
            }
            if row == Row::System
                && let Some(score) = slot.system_data.calculated_score
            {
                tags.push(format!("Sys:{score}%"));
            }
            if row == Row::Process {
                if let Some(status) = slot.process_status {
                    tags.push(status.label().to_string());
                }
                if let Some(value) = slot.process_value {
                    tags.push(format!("{value:?}"));
                }
            }
            if !tags.is_empty() {
                lines.push(tags.join(" "));
            }
            cells.push(lines);
        }

        let height = cells.iter().map(|c| c.len()).max().unwrap_or(1).max(1);
        for line_idx in 0..height {
            let mut line = format!("{:>9} │", if line_idx == 0 { row.label() } else { "" });
            for cell in &cells {
                let text = cell.get(line_idx).map(String::as_str).unwrap_or("");
                let pad = SNAPSHOT_CELL_WIDTH.saturating_sub(display_width(text));
                line.push_str(&format!(" {}{} │", text, " ".repeat(pad)));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push('\n');
    }

    // Connector summary under the grid.
    let mut connectors = Vec::new();
    for window in visible.windows(2) {
        let (here, next) = (window[0], window[1]);
        let column = &sheet.columns[here];
        let next_col = &sheet.columns[next];
        if next_col.is_parallel {
            connectors.push(format!("step {} ∥ step {}", here + 1, next + 1));
        } else if column.has_transition {
            connectors.push(format!(
                "step {} → step {} ({})",
                here + 1,
                next + 1,
                column.transition_next
            ));
        }
    }
    if !connectors.is_empty() {
        out.push_str(&connectors.join("\n"));
        out.push('\n');
    }
    out
}

pub fn write_text_snapshot(
    path: &Path,
    project: &Project,
    config: &BoardConfig,
) -> Result<(), ExchangeError> {
    fs::write(path, to_text_snapshot(project, config)).map_err(|source| {
        ExchangeError::WriteError {
            path: path.display().to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, QaEntry, QaResult};
    use pretty_assertions::assert_eq;

    #[test]
    fn csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a; b"), "\"a; b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "two lines");
    }

    #[test]
    fn csv_ids_continue_across_sheets_ignoring_visibility() {
        let config = BoardConfig::default();
        let mut project = Project::new(&config);
        project.sheets[0].columns[0].slot_mut(Row::Output).text = "one".into();
        project.sheets[0].columns[0].is_visible = false;
        let mut second = crate::model::Sheet::new("Second", &config);
        second.columns[0].slot_mut(Row::Output).text = "two".into();
        project.sheets.push(second);

        let csv = to_csv(&project);
        assert!(csv.contains("OUT1"));
        assert!(csv.contains("OUT2"));
    }

    #[test]
    fn csv_flattens_qa_results() {
        let config = BoardConfig::default();
        let mut project = Project::new(&config);
        let input = project.sheets[0].columns[0].slot_mut(Row::Input);
        input.text = "order".into();
        input.qa.insert(
            "complete".into(),
            QaEntry { result: Some(QaResult::NotOk), note: "missing date".into() },
        );
        let csv = to_csv(&project);
        assert!(csv.contains("complete: NOT_OK"));
    }

    #[test]
    fn import_rejects_missing_or_empty_sheets() {
        let config = BoardConfig::default();
        assert!(matches!(
            import_json("{\"projectTitle\":\"x\"}", &config),
            Err(ExchangeError::NoSheets)
        ));
        assert!(matches!(
            import_json("{\"sheets\":[]}", &config),
            Err(ExchangeError::NoSheets)
        ));
        assert!(matches!(
            import_json("not json", &config),
            Err(ExchangeError::NotJson(_))
        ));
    }

    #[test]
    fn import_accepts_and_sanitizes_valid_document() {
        let config = BoardConfig::default();
        let project = import_json(
            r#"{"projectTitle":"Imported","sheets":[{"name":"Flow","columns":[]}]}"#,
            &config,
        )
        .unwrap();
        assert_eq!(project.title, "Imported");
        assert_eq!(project.sheets[0].columns.len(), 1);
    }

    #[test]
    fn snapshot_skips_hidden_columns_and_shows_links() {
        let config = BoardConfig::default();
        let mut project = Project::new(&config);
        {
            let columns = &mut project.sheets[0].columns;
            columns[0].slot_mut(Row::Output).text = "shipment".into();
            columns.push(Column::new(&config));
            columns[1].slot_mut(Row::Input).linked_source_id = Some("OUT1".into());
            columns.push(Column::new(&config));
            columns[2].is_visible = false;
            columns[2].slot_mut(Row::Process).text = "never shown".into();
        }
        let snapshot = to_text_snapshot(&project, &config);
        assert!(snapshot.contains("shipment"));
        assert!(snapshot.contains("[OUT1 ⇒]"));
        assert!(!snapshot.contains("never shown"));
    }
}
