use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::config::BoardConfig;

/// The six fixed SIPOC rows, in board order top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Row {
    Supplier,
    System,
    Input,
    Process,
    Output,
    Customer,
}

pub const ROW_COUNT: usize = 6;

impl Row {
    pub const ALL: [Row; ROW_COUNT] = [
        Row::Supplier,
        Row::System,
        Row::Input,
        Row::Process,
        Row::Output,
        Row::Customer,
    ];

    /// Position within a column's slot array.
    pub fn index(self) -> usize {
        match self {
            Row::Supplier => 0,
            Row::System => 1,
            Row::Input => 2,
            Row::Process => 3,
            Row::Output => 4,
            Row::Customer => 5,
        }
    }

    pub fn from_index(idx: usize) -> Option<Row> {
        Row::ALL.get(idx).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Row::Supplier => "Supplier",
            Row::System => "System",
            Row::Input => "Input",
            Row::Process => "Process",
            Row::Output => "Output",
            Row::Customer => "Customer",
        }
    }

    /// Rows that carry structured detail data (and so open the detail editor).
    pub fn has_details(self) -> bool {
        matches!(self, Row::System | Row::Input | Row::Process | Row::Output)
    }
}

/// Outcome recorded for one quality criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QaResult {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NOT_OK")]
    NotOk,
    #[serde(rename = "NA")]
    NotApplicable,
}

/// Per-criterion quality record: result plus a free-text note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QaEntry {
    #[serde(default)]
    pub result: Option<QaResult>,
    #[serde(default)]
    pub note: String,
}

/// What kind of activity a process step is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    #[serde(rename = "Taak", alias = "Task")]
    Task,
    #[serde(rename = "Afspraak", alias = "Appointment")]
    Appointment,
    #[serde(rename = "Besluit", alias = "Decision")]
    Decision,
    #[serde(rename = "Wacht", alias = "Wait")]
    Wait,
}

impl ActivityType {
    pub fn icon(self) -> &'static str {
        match self {
            ActivityType::Task => "📝",
            ActivityType::Appointment => "📅",
            ActivityType::Decision => "💎",
            ActivityType::Wait => "⏳",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityType::Task => "Task",
            ActivityType::Appointment => "Appointment",
            ActivityType::Decision => "Decision",
            ActivityType::Wait => "Wait",
        }
    }
}

/// Lean classification of a process step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeanValue {
    /// Customer value-adding
    VA,
    /// Business-necessary, not value-adding
    BNVA,
    /// Pure waste
    NVA,
}

impl LeanValue {
    pub fn label(self) -> &'static str {
        match self {
            LeanValue::VA => "VA - Customer value",
            LeanValue::BNVA => "BNVA - Necessary",
            LeanValue::NVA => "NVA - Waste",
        }
    }
}

/// Control status of a process step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessStatus {
    Sad,
    Neutral,
    Happy,
}

impl ProcessStatus {
    pub fn face(self) -> &'static str {
        match self {
            ProcessStatus::Sad => "☹",
            ProcessStatus::Neutral => "😐",
            ProcessStatus::Happy => "🙂",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProcessStatus::Sad => "Not in control",
            ProcessStatus::Neutral => "Fragile",
            ProcessStatus::Happy => "In control",
        }
    }
}

/// Hard/soft classification of an input/output definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DefinitionKind {
    /// Necessary (hard stop)
    Hard,
    /// Desirable (soft)
    Soft,
}

/// One item/specification row on an Input or Output slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub specifications: String,
    #[serde(default, rename = "type")]
    pub kind: Option<DefinitionKind>,
}

impl Definition {
    pub fn is_empty(&self) -> bool {
        self.item.trim().is_empty()
    }
}

/// One logged disruption scenario on a Process slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Disruption {
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub workaround: String,
}

impl Disruption {
    pub fn is_empty(&self) -> bool {
        self.scenario.trim().is_empty()
    }
}

/// System-fit questionnaire answers, keyed by question id. Answers are 0–3
/// (higher = worse fit); `calculated_score` is derived on detail save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemData {
    #[serde(default)]
    pub answers: IndexMap<String, Option<u8>>,
    #[serde(default, rename = "calculatedScore")]
    pub calculated_score: Option<u8>,
}

/// Workplace-experience tag on a process step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceTag {
    Obstacle,
    Routine,
    Flow,
}

impl ExperienceTag {
    pub fn label(self) -> &'static str {
        match self {
            ExperienceTag::Obstacle => "Obstacle",
            ExperienceTag::Routine => "Routine",
            ExperienceTag::Flow => "Flow",
        }
    }
}

/// Conditional routing metadata for a gate step: pass/fail targets plus the
/// prerequisite checks they depend on (all process-slot ids).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    #[serde(default, rename = "passTarget")]
    pub pass_target: Option<String>,
    #[serde(default, rename = "failTarget")]
    pub fail_target: Option<String>,
    #[serde(default)]
    pub checks: Vec<String>,
}

/// One sticky cell. Every slot carries the full superset of fields
/// regardless of row; only row-appropriate fields are populated/displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    /// Input rows only: id label ("OUT3") of the output this input mirrors.
    #[serde(default)]
    pub linked_source_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<ActivityType>,
    #[serde(default)]
    pub process_value: Option<LeanValue>,
    #[serde(default)]
    pub process_status: Option<ProcessStatus>,
    #[serde(default)]
    pub success_factors: String,
    /// Root causes (Sad/Neutral analysis).
    #[serde(default)]
    pub causes: Vec<String>,
    /// Countermeasures.
    #[serde(default)]
    pub improvements: Vec<String>,
    /// Quality record per configured criterion key.
    #[serde(default)]
    pub qa: IndexMap<String, QaEntry>,
    #[serde(default)]
    pub system_data: SystemData,
    #[serde(default)]
    pub input_definitions: Vec<Definition>,
    #[serde(default)]
    pub disruptions: Vec<Disruption>,
    #[serde(default)]
    pub experience: Option<ExperienceTag>,
    #[serde(default)]
    pub experience_note: String,
    #[serde(default)]
    pub gate: Option<Gate>,
}

impl Slot {
    /// Fresh default-valued slot: qa pre-filled with one entry per configured
    /// criterion, system answers pre-filled per configured question.
    pub fn new(config: &BoardConfig) -> Slot {
        let mut qa = IndexMap::new();
        for criterion in &config.criteria {
            qa.insert(criterion.key.clone(), QaEntry::default());
        }
        let mut answers = IndexMap::new();
        for question in &config.system_questions {
            answers.insert(question.id.clone(), Some(0));
        }
        Slot {
            id: uuid::Uuid::new_v4().to_string(),
            text: String::new(),
            linked_source_id: None,
            kind: Some(ActivityType::Task),
            process_value: Some(LeanValue::VA),
            process_status: None,
            success_factors: String::new(),
            causes: Vec::new(),
            improvements: Vec::new(),
            qa,
            system_data: SystemData {
                answers,
                calculated_score: None,
            },
            input_definitions: Vec::new(),
            disruptions: Vec::new(),
            experience: None,
            experience_note: String::new(),
            gate: None,
        }
    }

    /// True when the trimmed body text is non-empty (drives id assignment).
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_index_round_trip() {
        for row in Row::ALL {
            assert_eq!(Row::from_index(row.index()), Some(row));
        }
        assert_eq!(Row::from_index(6), None);
    }

    #[test]
    fn new_slot_prefills_qa_and_system_answers() {
        let config = BoardConfig::default();
        let slot = Slot::new(&config);
        assert_eq!(slot.qa.len(), config.criteria.len());
        for entry in slot.qa.values() {
            assert_eq!(entry.result, None);
            assert_eq!(entry.note, "");
        }
        assert_eq!(slot.system_data.answers.len(), config.system_questions.len());
        assert!(slot.system_data.answers.values().all(|v| *v == Some(0)));
        assert_eq!(slot.system_data.calculated_score, None);
    }

    #[test]
    fn sibling_slots_are_independent() {
        let config = BoardConfig::default();
        let a = Slot::new(&config);
        let b = Slot::new(&config);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn qa_result_serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&QaResult::NotOk).unwrap(), "\"NOT_OK\"");
        assert_eq!(serde_json::to_string(&QaResult::NotApplicable).unwrap(), "\"NA\"");
    }
}
