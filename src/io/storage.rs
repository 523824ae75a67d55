use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::Value;

use crate::model::{BoardConfig, Column, Project, QaEntry, ROW_COUNT, Sheet, Slot};

/// Error type for autosave persistence. Quota exhaustion is surfaced
/// distinctly so the UI can suggest exporting and freeing space.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage full while writing {path}: export your project and free space")]
    Quota { path: String },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: String,
        source: std::io::Error,
    },
    #[error("could not serialize project: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// How the load path obtained the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No autosave blob existed; fresh default project.
    Fresh,
    /// Blob read and (possibly backfilled) loaded.
    Loaded,
    /// Blob existed but was unreadable; fresh default project.
    CorruptFallback,
}

/// Read the autosave blob. Never fails: missing file → fresh project,
/// corrupt JSON → fresh project, old/partial data → backfilled project.
pub fn load_or_default(path: &Path, config: &BoardConfig) -> (Project, LoadOutcome) {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(_) => return (Project::new(config), LoadOutcome::Fresh),
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => (sanitize(value, config), LoadOutcome::Loaded),
        Err(_) => (Project::new(config), LoadOutcome::CorruptFallback),
    }
}

/// Deserialize a project tree from loosely-shaped JSON and repair every
/// invariant: ≥1 sheet, ≥1 column per sheet, exactly 6 slots per column,
/// qa/system maps carrying one entry per configured criterion/question,
/// fresh ids where missing, and a resolving active sheet id. Old or
/// partially-malformed saved data never yields a slot missing a field.
pub fn sanitize(value: Value, config: &BoardConfig) -> Project {
    let mut project: Project = match serde_json::from_value(value) {
        Ok(p) => p,
        Err(_) => return Project::new(config),
    };
    backfill(&mut project, config);
    project
}

fn backfill(project: &mut Project, config: &BoardConfig) {
    if project.id.is_empty() {
        project.id = uuid::Uuid::new_v4().to_string();
    }
    if project.sheets.is_empty() {
        project.sheets.push(Sheet::new(
            crate::model::DEFAULT_SHEET_NAME,
            config,
        ));
    }
    for (idx, sheet) in project.sheets.iter_mut().enumerate() {
        if sheet.id.is_empty() {
            sheet.id = uuid::Uuid::new_v4().to_string();
        }
        if sheet.name.trim().is_empty() {
            sheet.name = format!("Process {}", idx + 1);
        }
        if sheet.columns.is_empty() {
            sheet.columns.push(Column::new(config));
        }
        for column in &mut sheet.columns {
            if column.id.is_empty() {
                column.id = uuid::Uuid::new_v4().to_string();
            }
            if column.slots.len() != ROW_COUNT {
                column.slots = (0..ROW_COUNT).map(|_| Slot::new(config)).collect();
                continue;
            }
            for slot in &mut column.slots {
                backfill_slot(slot, config);
            }
        }
    }
    let resolves = project
        .sheets
        .iter()
        .any(|s| s.id == project.active_sheet_id);
    if !resolves {
        project.active_sheet_id = project.sheets[0].id.clone();
    }
}

fn backfill_slot(slot: &mut Slot, config: &BoardConfig) {
    if slot.id.is_empty() {
        slot.id = uuid::Uuid::new_v4().to_string();
    }
    for criterion in &config.criteria {
        slot.qa
            .entry(criterion.key.clone())
            .or_insert_with(QaEntry::default);
    }
    for question in &config.system_questions {
        slot.system_data
            .answers
            .entry(question.id.clone())
            .or_insert(Some(0));
    }
}

/// Persist the project: stamp `lastModified`, then write pretty JSON
/// atomically (temp file + rename) so a crash never truncates the blob.
pub fn save(path: &Path, project: &mut Project) -> Result<(), StorageError> {
    project.last_modified = Some(Utc::now());
    let json = serde_json::to_string_pretty(project)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let write = || -> Result<(), std::io::Error> {
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    };
    write().map_err(|source| {
        let path = path.display().to_string();
        if matches!(
            source.kind(),
            std::io::ErrorKind::StorageFull | std::io::ErrorKind::QuotaExceeded
        ) {
            StorageError::Quota { path }
        } else {
            StorageError::WriteError { path, source }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_fresh_project() {
        let dir = TempDir::new().unwrap();
        let config = BoardConfig::default();
        let (project, outcome) = load_or_default(&dir.path().join("sipoc.json"), &config);
        assert_eq!(outcome, LoadOutcome::Fresh);
        assert_eq!(project.sheets.len(), 1);
    }

    #[test]
    fn corrupt_json_falls_back_to_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sipoc.json");
        fs::write(&path, "not json {{{").unwrap();
        let (project, outcome) = load_or_default(&path, &BoardConfig::default());
        assert_eq!(outcome, LoadOutcome::CorruptFallback);
        assert_eq!(project.sheets.len(), 1);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sipoc.json");
        let config = BoardConfig::default();
        let mut project = Project::new(&config);
        project.title = "Claims intake".into();
        project.sheets[0].columns[0].slot_mut(Row::Process).text = "Scan mail".into();

        save(&path, &mut project).unwrap();
        assert!(project.last_modified.is_some());

        let (loaded, outcome) = load_or_default(&path, &config);
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(loaded, project);
    }

    #[test]
    fn sanitize_backfills_partial_blob() {
        let config = BoardConfig::default();
        let value: Value = serde_json::from_str(
            r#"{
                "projectTitle": "Old save",
                "sheets": [
                    { "name": "Flow", "columns": [ { "slots": [] } ] }
                ]
            }"#,
        )
        .unwrap();
        let project = sanitize(value, &config);
        assert_eq!(project.title, "Old save");
        assert_eq!(project.sheets.len(), 1);
        let column = &project.sheets[0].columns[0];
        assert_eq!(column.slots.len(), ROW_COUNT);
        for slot in &column.slots {
            assert_eq!(slot.qa.len(), config.criteria.len());
            assert_eq!(slot.system_data.answers.len(), config.system_questions.len());
            assert!(!slot.id.is_empty());
        }
        assert_eq!(project.active_sheet_id, project.sheets[0].id);
    }

    #[test]
    fn sanitize_preserves_known_slot_fields_and_fills_missing_qa_keys() {
        let config = BoardConfig::default();
        let value: Value = serde_json::from_str(
            r#"{
                "sheets": [{
                    "id": "s1",
                    "name": "Flow",
                    "columns": [{
                        "id": "c1",
                        "slots": [
                            {"id": "a", "text": "supplier"},
                            {"id": "b"},
                            {"id": "c", "text": "input", "qa": {"complete": {"result": "OK"}}},
                            {"id": "d"},
                            {"id": "e"},
                            {"id": "f"}
                        ]
                    }]
                }],
                "activeSheetId": "s1"
            }"#,
        )
        .unwrap();
        let project = sanitize(value, &config);
        let input = project.sheets[0].columns[0].slot(Row::Input);
        assert_eq!(input.text, "input");
        assert_eq!(
            input.qa.get("complete").unwrap().result,
            Some(crate::model::QaResult::Ok)
        );
        assert_eq!(input.qa.len(), config.criteria.len());
    }

    #[test]
    fn sanitize_garbage_shape_yields_fresh() {
        let config = BoardConfig::default();
        let project = sanitize(serde_json::json!({ "sheets": 42 }), &config);
        assert_eq!(project.title, crate::model::DEFAULT_PROJECT_TITLE);
    }
}
