use serde::{Deserialize, Serialize};

use super::config::BoardConfig;
use super::slot::{ROW_COUNT, Row, Slot};

/// One process step lane: the fixed six-row stack of slots plus lane flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_parallel: bool,
    #[serde(default)]
    pub has_transition: bool,
    /// Free text shown on the connector to the next step (e.g. elapsed time).
    #[serde(default)]
    pub transition_next: String,
    /// Cached output-id label ("OUT3"); refreshed by the render pass.
    #[serde(default)]
    pub output_id: Option<String>,
    /// Always exactly `ROW_COUNT` slots, in `Row` order.
    #[serde(default)]
    pub slots: Vec<Slot>,
}

fn default_true() -> bool {
    true
}

impl Column {
    /// Fresh column with six default slots.
    pub fn new(config: &BoardConfig) -> Column {
        Column {
            id: uuid::Uuid::new_v4().to_string(),
            is_visible: true,
            is_parallel: false,
            has_transition: false,
            transition_next: String::new(),
            output_id: None,
            slots: (0..ROW_COUNT).map(|_| Slot::new(config)).collect(),
        }
    }

    pub fn slot(&self, row: Row) -> &Slot {
        &self.slots[row.index()]
    }

    pub fn slot_mut(&mut self, row: Row) -> &mut Slot {
        &mut self.slots[row.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_column_has_six_slots_in_row_order() {
        let column = Column::new(&BoardConfig::default());
        assert_eq!(column.slots.len(), ROW_COUNT);
        assert!(column.is_visible);
        assert!(!column.is_parallel);
        assert!(!column.has_transition);
    }

    #[test]
    fn slot_accessor_matches_row_index() {
        let mut column = Column::new(&BoardConfig::default());
        column.slot_mut(Row::Output).text = "invoice".into();
        assert_eq!(column.slots[4].text, "invoice");
        assert_eq!(column.slot(Row::Output).text, "invoice");
    }
}
