use indexmap::IndexMap;

use crate::model::{BoardConfig, Project, QaEntry, QaResult, Row, Sheet};

/// IN/OUT counters contributed by the sheets before the active one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterOffsets {
    pub in_start: usize,
    pub out_start: usize,
}

/// Counts of non-empty Input/Output slots across all *visible* columns in
/// all sheets strictly preceding the active sheet in array order.
pub fn counters_before_active(project: &Project) -> CounterOffsets {
    let mut offsets = CounterOffsets::default();
    for sheet in &project.sheets {
        if sheet.id == project.active_sheet_id {
            break;
        }
        for column in &sheet.columns {
            if !column.is_visible {
                continue;
            }
            if column.slot(Row::Input).has_text() {
                offsets.in_start += 1;
            }
            if column.slot(Row::Output).has_text() {
                offsets.out_start += 1;
            }
        }
    }
    offsets
}

/// Registry of every output across the entire project: sequential `OUT{n}`
/// label → current output text. Deliberately counts *all* sheets and
/// *ignores* visibility, unlike `counters_before_active`: link targets stay
/// stable when columns are hidden.
pub fn all_outputs(project: &Project) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    let mut counter = 0;
    for sheet in &project.sheets {
        for column in &sheet.columns {
            let output = column.slot(Row::Output);
            if output.has_text() {
                counter += 1;
                map.insert(format!("OUT{counter}"), output.text.clone());
            }
        }
    }
    map
}

/// Derived id labels for one rendered column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnIds {
    pub input: Option<String>,
    pub output: Option<String>,
    /// The input id came from a satisfied link rather than a minted IN{n}.
    pub input_linked: bool,
}

/// Assign IN/OUT id labels for the active sheet, left to right over visible
/// columns, seeded from the cross-sheet offsets. Hidden columns yield None.
/// A satisfied `linked_source_id` displays the linked OUT id instead of
/// minting an input id, even when the input's own text is empty.
pub fn assign_ids(project: &Project) -> Vec<Option<ColumnIds>> {
    let offsets = counters_before_active(project);
    let outputs = all_outputs(project);
    let sheet = project.active_sheet();

    let mut in_counter = 0;
    let mut out_counter = 0;
    let mut ids = Vec::with_capacity(sheet.columns.len());

    for column in &sheet.columns {
        if !column.is_visible {
            ids.push(None);
            continue;
        }
        let mut col_ids = ColumnIds::default();

        let input = column.slot(Row::Input);
        if let Some(link) = &input.linked_source_id
            && outputs.contains_key(link)
        {
            col_ids.input = Some(link.clone());
            col_ids.input_linked = true;
        } else if input.has_text() {
            in_counter += 1;
            col_ids.input = Some(format!("IN{}", offsets.in_start + in_counter));
        }

        if column.slot(Row::Output).has_text() {
            out_counter += 1;
            col_ids.output = Some(format!("OUT{}", offsets.out_start + out_counter));
        }

        ids.push(Some(col_ids));
    }
    ids
}

/// Display text for a slot: the linked output's current text when an Input
/// slot has a satisfied link, else the slot's own text. The bool reports
/// whether the slot is link-driven (and so read-only on the board).
pub fn display_text(
    slot: &crate::model::Slot,
    row: Row,
    outputs: &IndexMap<String, String>,
) -> (String, bool) {
    if row == Row::Input
        && let Some(link) = &slot.linked_source_id
        && let Some(text) = outputs.get(link)
    {
        return (text.clone(), true);
    }
    (slot.text.clone(), false)
}

/// Weighted QA score over the answered (OK/NOT_OK) criteria, 0–100.
/// None when nothing is answered.
pub fn qa_score(qa: &IndexMap<String, QaEntry>, config: &BoardConfig) -> Option<u8> {
    let mut total = 0u32;
    let mut earned = 0u32;
    for criterion in &config.criteria {
        let result = qa.get(&criterion.key).and_then(|e| e.result);
        match result {
            Some(QaResult::Ok) => {
                total += criterion.weight;
                earned += criterion.weight;
            }
            Some(QaResult::NotOk) => total += criterion.weight,
            Some(QaResult::NotApplicable) | None => {}
        }
    }
    if total == 0 {
        None
    } else {
        Some((100.0 * earned as f64 / total as f64).round() as u8)
    }
}

/// System-fit score: answers are 0–3 where higher means worse fit, so the
/// score is inverted. None when no question is answered.
pub fn system_score(
    answers: &IndexMap<String, Option<u8>>,
    config: &BoardConfig,
) -> Option<u8> {
    let max = config.system_max_points();
    if max == 0 {
        return None;
    }
    let mut sum = 0u32;
    let mut answered = 0u32;
    for question in &config.system_questions {
        if let Some(Some(value)) = answers.get(&question.id) {
            sum += *value as u32;
            answered += 1;
        }
    }
    if answered == 0 {
        return None;
    }
    let capped = sum.min(max);
    Some((100.0 * (1.0 - capped as f64 / max as f64)).round() as u8)
}

/// Badge coloring tier for a 0–100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    High,
    Medium,
    Low,
}

pub fn score_tier(score: u8) -> ScoreTier {
    if score >= 80 {
        ScoreTier::High
    } else if score >= 60 {
        ScoreTier::Medium
    } else {
        ScoreTier::Low
    }
}

/// Happy/neutral/sad counts over the visible process row of one sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTallies {
    pub happy: usize,
    pub neutral: usize,
    pub sad: usize,
}

pub fn status_tallies(sheet: &Sheet) -> StatusTallies {
    use crate::model::ProcessStatus;
    let mut tallies = StatusTallies::default();
    for column in &sheet.columns {
        if !column.is_visible {
            continue;
        }
        match column.slot(Row::Process).process_status {
            Some(ProcessStatus::Happy) => tallies.happy += 1,
            Some(ProcessStatus::Neutral) => tallies.neutral += 1,
            Some(ProcessStatus::Sad) => tallies.sad += 1,
            None => {}
        }
    }
    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoardConfig, Column};

    fn two_column_project(config: &BoardConfig) -> Project {
        let mut project = Project::new(config);
        project.sheets[0].columns.push(Column::new(config));
        project
    }

    #[test]
    fn id_assignment_skips_empty_inputs() {
        let config = BoardConfig::default();
        let mut project = two_column_project(&config);
        {
            let cols = &mut project.sheets[0].columns;
            cols[0].slot_mut(Row::Input).text = "order form".into();
            cols[0].slot_mut(Row::Output).text = "validated order".into();
            cols[1].slot_mut(Row::Output).text = "invoice".into();
        }
        let ids = assign_ids(&project);
        let a = ids[0].as_ref().unwrap();
        let b = ids[1].as_ref().unwrap();
        assert_eq!(a.input.as_deref(), Some("IN1"));
        assert_eq!(a.output.as_deref(), Some("OUT1"));
        assert_eq!(b.input, None);
        assert_eq!(b.output.as_deref(), Some("OUT2"));
    }

    #[test]
    fn satisfied_link_displays_out_id_even_with_empty_text() {
        let config = BoardConfig::default();
        let mut project = two_column_project(&config);
        {
            let cols = &mut project.sheets[0].columns;
            cols[0].slot_mut(Row::Output).text = "shipment".into();
            cols[1].slot_mut(Row::Input).linked_source_id = Some("OUT1".into());
        }
        let ids = assign_ids(&project);
        let b = ids[1].as_ref().unwrap();
        assert_eq!(b.input.as_deref(), Some("OUT1"));
        assert!(b.input_linked);

        let outputs = all_outputs(&project);
        let (text, linked) =
            display_text(project.sheets[0].columns[1].slot(Row::Input), Row::Input, &outputs);
        assert_eq!(text, "shipment");
        assert!(linked);
    }

    #[test]
    fn dangling_link_falls_back_to_minting() {
        let config = BoardConfig::default();
        let mut project = Project::new(&config);
        let input = project.sheets[0].columns[0].slot_mut(Row::Input);
        input.text = "paper form".into();
        input.linked_source_id = Some("OUT9".into());
        let ids = assign_ids(&project);
        let a = ids[0].as_ref().unwrap();
        assert_eq!(a.input.as_deref(), Some("IN1"));
        assert!(!a.input_linked);
    }

    #[test]
    fn hidden_columns_are_skipped_but_registry_ignores_visibility() {
        let config = BoardConfig::default();
        let mut project = two_column_project(&config);
        {
            let cols = &mut project.sheets[0].columns;
            cols[0].slot_mut(Row::Output).text = "draft".into();
            cols[0].is_visible = false;
            cols[1].slot_mut(Row::Output).text = "final".into();
        }
        let ids = assign_ids(&project);
        assert!(ids[0].is_none());
        // Visible numbering restarts without the hidden column...
        assert_eq!(ids[1].as_ref().unwrap().output.as_deref(), Some("OUT1"));
        // ...but the global registry still counts it.
        let outputs = all_outputs(&project);
        assert_eq!(outputs.get("OUT1").unwrap(), "draft");
        assert_eq!(outputs.get("OUT2").unwrap(), "final");
    }

    #[test]
    fn counters_respect_sheet_order_and_visibility() {
        let config = BoardConfig::default();
        let mut project = Project::new(&config);
        project.sheets[0].columns[0].slot_mut(Row::Input).text = "in".into();
        project.sheets[0].columns[0].slot_mut(Row::Output).text = "out".into();
        let mut hidden = Column::new(&config);
        hidden.slot_mut(Row::Output).text = "hidden out".into();
        hidden.is_visible = false;
        project.sheets[0].columns.push(hidden);

        let second = Sheet::new("Second", &config);
        project.active_sheet_id = second.id.clone();
        project.sheets.push(second);

        let offsets = counters_before_active(&project);
        assert_eq!(offsets, CounterOffsets { in_start: 1, out_start: 1 });
    }

    #[test]
    fn qa_score_uses_only_answered_weights() {
        let config = BoardConfig::default();
        let mut qa: IndexMap<String, QaEntry> = IndexMap::new();
        let results = [
            Some(QaResult::Ok),
            Some(QaResult::NotOk),
            Some(QaResult::NotApplicable),
            Some(QaResult::Ok),
            None,
            Some(QaResult::Ok),
        ];
        for (criterion, result) in config.criteria.iter().zip(results) {
            qa.insert(criterion.key.clone(), QaEntry { result, note: String::new() });
        }
        // NA and unanswered weights stay out of the total:
        // earned 5+3+1 = 9 over total 5+5+3+1 = 14
        assert_eq!(qa_score(&qa, &config), Some(64));
    }

    #[test]
    fn qa_score_none_when_nothing_answered() {
        let config = BoardConfig::default();
        let qa = crate::model::Slot::new(&config).qa;
        assert_eq!(qa_score(&qa, &config), None);
    }

    #[test]
    fn system_score_inverts_answer_sum() {
        let config = BoardConfig::default();
        let mut answers: IndexMap<String, Option<u8>> = IndexMap::new();
        for (question, value) in config.system_questions.iter().zip([0u8, 1, 2, 3, 0]) {
            answers.insert(question.id.clone(), Some(value));
        }
        // sum 6 of max 15 → round(100 * (1 - 6/15)) = 60
        assert_eq!(system_score(&answers, &config), Some(60));
    }

    #[test]
    fn system_score_none_when_unanswered() {
        let config = BoardConfig::default();
        let mut answers: IndexMap<String, Option<u8>> = IndexMap::new();
        for question in &config.system_questions {
            answers.insert(question.id.clone(), None);
        }
        assert_eq!(system_score(&answers, &config), None);
    }

    #[test]
    fn score_tier_boundaries() {
        assert_eq!(score_tier(80), ScoreTier::High);
        assert_eq!(score_tier(79), ScoreTier::Medium);
        assert_eq!(score_tier(60), ScoreTier::Medium);
        assert_eq!(score_tier(59), ScoreTier::Low);
    }
}
