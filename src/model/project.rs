use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::BoardConfig;
use super::sheet::{DEFAULT_SHEET_NAME, Sheet};

pub const DEFAULT_PROJECT_TITLE: &str = "New Process Project";
pub const SCHEMA_VERSION: &str = "2.0";

/// Root aggregate: the whole board document. Serialized as the autosave
/// blob and the export/import file format (camelCase wire names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_title", rename = "projectTitle")]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub active_sheet_id: String,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

fn default_title() -> String {
    DEFAULT_PROJECT_TITLE.to_string()
}

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

impl Project {
    /// Fresh project: one sheet, one column, active id pointing at the sheet.
    pub fn new(config: &BoardConfig) -> Project {
        let first = Sheet::new(DEFAULT_SHEET_NAME, config);
        Project {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_PROJECT_TITLE.to_string(),
            author: String::new(),
            created_at: Utc::now(),
            last_modified: None,
            version: SCHEMA_VERSION.to_string(),
            active_sheet_id: first.id.clone(),
            sheets: vec![first],
        }
    }

    /// The active sheet; falls back to the first sheet if the id dangles.
    pub fn active_sheet(&self) -> &Sheet {
        self.sheets
            .iter()
            .find(|s| s.id == self.active_sheet_id)
            .unwrap_or(&self.sheets[0])
    }

    pub fn active_sheet_mut(&mut self) -> &mut Sheet {
        let idx = self.active_sheet_index();
        &mut self.sheets[idx]
    }

    pub fn active_sheet_index(&self) -> usize {
        self.sheets
            .iter()
            .position(|s| s.id == self.active_sheet_id)
            .unwrap_or(0)
    }
}
