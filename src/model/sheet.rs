use serde::{Deserialize, Serialize};

use super::column::Column;
use super::config::BoardConfig;

pub const DEFAULT_SHEET_NAME: &str = "Process Flow 1";

/// One diagram tab: an ordered list of columns. Always holds at least one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, config: &BoardConfig) -> Sheet {
        Sheet {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            columns: vec![Column::new(config)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sheet_starts_with_one_column() {
        let sheet = Sheet::new("Intake", &BoardConfig::default());
        assert_eq!(sheet.columns.len(), 1);
        assert_eq!(sheet.name, "Intake");
    }
}
