use indexmap::IndexMap;

use crate::model::{
    ActivityType, BoardConfig, Definition, Disruption, ExperienceTag, LeanValue, ProcessStatus,
    QaEntry, Slot,
};

use super::derive::system_score;

/// A committed batch of detail-editor field writes for one slot. The editor
/// accumulates changes on a scratch copy and submits them as one patch
/// through the store, keeping the store the single writer.
#[derive(Debug, Clone)]
pub enum SlotPatch {
    /// Process row: status, classification and analysis fields.
    Process {
        status: Option<ProcessStatus>,
        kind: Option<ActivityType>,
        process_value: Option<LeanValue>,
        success_factors: String,
        causes: Vec<String>,
        improvements: Vec<String>,
        disruptions: Vec<Disruption>,
        experience: Option<ExperienceTag>,
        experience_note: String,
    },
    /// System row: questionnaire answers; the fit score is derived here.
    System {
        answers: IndexMap<String, Option<u8>>,
    },
    /// Input/Output rows: definitions, quality records and (inputs only)
    /// the output link.
    Io {
        linked_source_id: Option<String>,
        definitions: Vec<Definition>,
        qa: IndexMap<String, QaEntry>,
    },
}

impl SlotPatch {
    /// Apply to the live slot. Dynamic rows that are effectively empty are
    /// filtered out; list text entries are trimmed-empty filtered the same
    /// way the editor's save path always did.
    pub fn apply(self, slot: &mut Slot, config: &BoardConfig) {
        match self {
            SlotPatch::Process {
                status,
                kind,
                process_value,
                success_factors,
                causes,
                improvements,
                disruptions,
                experience,
                experience_note,
            } => {
                slot.process_status = status;
                slot.kind = kind;
                slot.process_value = process_value;
                slot.success_factors = success_factors;
                slot.causes = causes.into_iter().filter(|c| !c.trim().is_empty()).collect();
                slot.improvements = improvements
                    .into_iter()
                    .filter(|c| !c.trim().is_empty())
                    .collect();
                slot.disruptions = disruptions.into_iter().filter(|d| !d.is_empty()).collect();
                slot.experience = experience;
                slot.experience_note = experience_note;
            }
            SlotPatch::System { answers } => {
                slot.system_data.calculated_score = system_score(&answers, config);
                slot.system_data.answers = answers;
            }
            SlotPatch::Io {
                linked_source_id,
                definitions,
                qa,
            } => {
                slot.linked_source_id = linked_source_id;
                slot.input_definitions =
                    definitions.into_iter().filter(|d| !d.is_empty()).collect();
                slot.qa = qa;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_patch_filters_empty_rows() {
        let config = BoardConfig::default();
        let mut slot = Slot::new(&config);
        let patch = SlotPatch::Process {
            status: Some(ProcessStatus::Sad),
            kind: Some(ActivityType::Task),
            process_value: Some(LeanValue::NVA),
            success_factors: String::new(),
            causes: vec!["  ".into(), "no validation".into()],
            improvements: vec![String::new()],
            disruptions: vec![
                Disruption { scenario: "system down".into(), frequency: Some("Often".into()), workaround: "paper".into() },
                Disruption::default(),
            ],
            experience: Some(ExperienceTag::Obstacle),
            experience_note: "daily friction".into(),
        };
        patch.apply(&mut slot, &config);
        assert_eq!(slot.causes, vec!["no validation"]);
        assert!(slot.improvements.is_empty());
        assert_eq!(slot.disruptions.len(), 1);
        assert_eq!(slot.process_status, Some(ProcessStatus::Sad));
        assert_eq!(slot.experience, Some(ExperienceTag::Obstacle));
    }

    #[test]
    fn system_patch_derives_score() {
        let config = BoardConfig::default();
        let mut slot = Slot::new(&config);
        let mut answers: IndexMap<String, Option<u8>> = IndexMap::new();
        for (question, value) in config.system_questions.iter().zip([0u8, 1, 2, 3, 0]) {
            answers.insert(question.id.clone(), Some(value));
        }
        SlotPatch::System { answers }.apply(&mut slot, &config);
        assert_eq!(slot.system_data.calculated_score, Some(60));
    }

    #[test]
    fn io_patch_sets_link_and_filters_definitions() {
        let config = BoardConfig::default();
        let mut slot = Slot::new(&config);
        let qa = slot.qa.clone();
        let patch = SlotPatch::Io {
            linked_source_id: Some("OUT2".into()),
            definitions: vec![
                Definition { item: "order".into(), specifications: "signed".into(), kind: None },
                Definition::default(),
            ],
            qa,
        };
        patch.apply(&mut slot, &config);
        assert_eq!(slot.linked_source_id.as_deref(), Some("OUT2"));
        assert_eq!(slot.input_definitions.len(), 1);
    }
}
