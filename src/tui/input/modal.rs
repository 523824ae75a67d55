use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::io::Severity;
use crate::io::StatusSink;
use crate::model::{
    ActivityType, BoardConfig, Definition, DefinitionKind, Disruption, ExperienceTag, LeanValue,
    ProcessStatus, QaResult, Row,
};
use crate::store::SlotPatch;
use crate::tui::app::{App, FieldEdit, Mode, ModalState};

use super::*;

/// One interactive field of the detail editor. Indices address rows of the
/// scratch slot's dynamic lists, or entries of the board config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Status,
    Kind,
    Lean,
    SuccessFactors,
    Experience,
    ExperienceNote,
    Cause(usize),
    AddCause,
    Improvement(usize),
    AddImprovement,
    DisruptionScenario(usize),
    DisruptionFrequency(usize),
    DisruptionWorkaround(usize),
    AddDisruption,
    Link,
    DefItem(usize),
    DefSpec(usize),
    DefKind(usize),
    AddDefinition,
    QaResult(usize),
    QaNote(usize),
    SystemAnswer(usize),
}

impl Field {
    /// Fields edited as free text (Enter to type)
    fn is_text(self) -> bool {
        matches!(
            self,
            Field::SuccessFactors
                | Field::ExperienceNote
                | Field::Cause(_)
                | Field::Improvement(_)
                | Field::DisruptionScenario(_)
                | Field::DisruptionWorkaround(_)
                | Field::DefItem(_)
                | Field::DefSpec(_)
                | Field::QaNote(_)
        )
    }

    /// Fields that cycle through a fixed option set
    fn is_select(self) -> bool {
        matches!(
            self,
            Field::Status
                | Field::Kind
                | Field::Lean
                | Field::Experience
                | Field::DisruptionFrequency(_)
                | Field::Link
                | Field::DefKind(_)
                | Field::QaResult(_)
                | Field::SystemAnswer(_)
        )
    }
}

/// Open the detail editor on a slot. The scratch copy gets one blank row in
/// each dynamic list so the editor always has something to type into.
pub fn open_modal(app: &mut App, col: usize, row: Row) {
    let Some(column) = app.project().active_sheet().columns.get(col) else {
        return;
    };
    let mut scratch = column.slot(row).clone();

    match row {
        Row::Process => {
            if scratch.causes.is_empty() {
                scratch.causes.push(String::new());
            }
            if scratch.improvements.is_empty() {
                scratch.improvements.push(String::new());
            }
            if scratch.disruptions.is_empty() {
                scratch.disruptions.push(Disruption::default());
            }
        }
        Row::Input | Row::Output => {
            if scratch.input_definitions.is_empty() {
                scratch.input_definitions.push(Definition::default());
            }
            for criterion in &app.store.config().criteria {
                scratch.qa.entry(criterion.key.clone()).or_default();
            }
        }
        Row::System => {
            for question in &app.store.config().system_questions {
                scratch
                    .system_data
                    .answers
                    .entry(question.id.clone())
                    .or_insert(None);
            }
        }
        _ => {}
    }

    let outputs = if row == Row::Input {
        app.store.all_outputs().into_iter().collect()
    } else {
        Vec::new()
    };

    app.modal = Some(ModalState {
        col,
        row,
        scratch,
        tab: 0,
        cursor: 0,
        scroll: 0,
        field_edit: None,
        outputs,
    });
    app.mode = Mode::Modal;
}

/// Field list for the modal's current tab, in display order
pub fn fields_for(state: &ModalState, config: &BoardConfig) -> Vec<Field> {
    let mut fields = Vec::new();
    match (state.row, state.tab) {
        (Row::Process, 0) => {
            fields.extend([Field::Status, Field::Kind, Field::Lean]);
            // Success factors belong to in-control steps only; the analysis
            // tabs cover the Sad/Neutral side.
            if state.scratch.process_status == Some(ProcessStatus::Happy) {
                fields.push(Field::SuccessFactors);
            }
            fields.extend([Field::Experience, Field::ExperienceNote]);
        }
        (Row::Process, 1) => {
            for i in 0..state.scratch.causes.len() {
                fields.push(Field::Cause(i));
            }
            fields.push(Field::AddCause);
            for i in 0..state.scratch.improvements.len() {
                fields.push(Field::Improvement(i));
            }
            fields.push(Field::AddImprovement);
        }
        (Row::Process, _) => {
            for i in 0..state.scratch.disruptions.len() {
                fields.push(Field::DisruptionScenario(i));
                fields.push(Field::DisruptionFrequency(i));
                fields.push(Field::DisruptionWorkaround(i));
            }
            fields.push(Field::AddDisruption);
        }
        (Row::System, _) => {
            for i in 0..config.system_questions.len() {
                fields.push(Field::SystemAnswer(i));
            }
        }
        (_, 0) => {
            if state.row == Row::Input {
                fields.push(Field::Link);
            }
            for i in 0..state.scratch.input_definitions.len() {
                fields.push(Field::DefItem(i));
                fields.push(Field::DefSpec(i));
                fields.push(Field::DefKind(i));
            }
            fields.push(Field::AddDefinition);
        }
        (_, _) => {
            for i in 0..config.criteria.len() {
                fields.push(Field::QaResult(i));
                fields.push(Field::QaNote(i));
            }
        }
    }
    fields
}

pub(super) fn handle_modal(app: &mut App, key: KeyEvent) {
    let Some(mut state) = app.modal.take() else {
        app.mode = Mode::Navigate;
        return;
    };
    let config = app.store.config().clone();

    // An active field edit captures text keys first. A tab switch commits
    // the in-progress edit so nothing is lost when the field list rebuilds.
    if state.field_edit.is_some() {
        if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) {
            if let Some(edit) = state.field_edit.take() {
                commit_field_text(&mut state, &config, edit.buffer);
            }
        } else {
            handle_field_edit(&mut state, &config, key);
            app.modal = Some(state);
            return;
        }
    }

    let fields = fields_for(&state, &config);
    let current = fields.get(state.cursor).copied();

    match key.code {
        KeyCode::Esc => {
            // Discard the scratch copy
            app.mode = Mode::Navigate;
            app.status("details discarded", Severity::Info);
            return;
        }
        KeyCode::Char('s') => {
            save_modal(app, state);
            return;
        }
        // Sync the scratch into the store without closing, so long detail
        // sessions can checkpoint.
        KeyCode::Char('S') => {
            let patch = build_patch(&state);
            app.store.save_slot_details(state.col, state.row, patch);
            app.status("details saved", Severity::Success);
        }
        KeyCode::Tab => {
            state.tab = (state.tab + 1) % state.tab_labels().len();
            state.cursor = 0;
            state.scroll = 0;
        }
        KeyCode::BackTab => {
            let tabs = state.tab_labels().len();
            state.tab = (state.tab + tabs - 1) % tabs;
            state.cursor = 0;
            state.scroll = 0;
        }
        KeyCode::Up | KeyCode::Char('k') => state.cursor = state.cursor.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            if state.cursor + 1 < fields.len() {
                state.cursor += 1;
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(field) = current {
                if field.is_text() {
                    let text = field_value_text(&state, field, &config);
                    state.field_edit = Some(FieldEdit {
                        cursor: text.len(),
                        buffer: text,
                    });
                } else if field.is_select() {
                    cycle_field(&mut state, &config, field, 1);
                } else {
                    add_row(&mut state, field);
                }
            }
        }
        // Sheet switch while the editor is open: sync the scratch into the
        // store first so nothing typed so far is lost, then close, since the
        // coordinates belong to the old sheet.
        KeyCode::Left if key.modifiers.contains(KeyModifiers::CONTROL) => {
            sync_and_switch(app, state, -1);
            return;
        }
        KeyCode::Right if key.modifiers.contains(KeyModifiers::CONTROL) => {
            sync_and_switch(app, state, 1);
            return;
        }
        KeyCode::Left => {
            if let Some(field) = current
                && field.is_select()
            {
                cycle_field(&mut state, &config, field, -1);
            }
        }
        KeyCode::Right => {
            if let Some(field) = current
                && field.is_select()
            {
                cycle_field(&mut state, &config, field, 1);
            }
        }
        KeyCode::Char(c @ '1'..='4') => {
            if let Some(Field::SystemAnswer(i)) = current {
                toggle_system_answer(&mut state, &config, i, c as u8 - b'1');
            }
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(field) = current {
                remove_row(&mut state, field);
                let remaining = fields_for(&state, &config).len();
                state.cursor = state.cursor.min(remaining.saturating_sub(1));
            }
        }
        _ => {}
    }

    app.modal = Some(state);
}

fn handle_field_edit(state: &mut ModalState, config: &BoardConfig, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        if let Some(edit) = state.field_edit.take() {
            commit_field_text(state, config, edit.buffer);
        }
        return;
    }
    if key.code == KeyCode::Esc {
        state.field_edit = None;
        return;
    }
    let Some(edit) = &mut state.field_edit else {
        return;
    };
    match key.code {
        KeyCode::Char(c) => {
            edit.buffer.insert(edit.cursor, c);
            edit.cursor += c.len_utf8();
        }
        KeyCode::Backspace => {
            if let Some(prev) = prev_boundary(&edit.buffer, edit.cursor) {
                edit.buffer.remove(prev);
                edit.cursor = prev;
            }
        }
        KeyCode::Delete => {
            if edit.cursor < edit.buffer.len() {
                edit.buffer.remove(edit.cursor);
            }
        }
        KeyCode::Left => {
            if let Some(prev) = prev_boundary(&edit.buffer, edit.cursor) {
                edit.cursor = prev;
            }
        }
        KeyCode::Right => edit.cursor = next_boundary(&edit.buffer, edit.cursor),
        KeyCode::Home => edit.cursor = 0,
        KeyCode::End => edit.cursor = edit.buffer.len(),
        _ => {}
    }
}

/// Current text of a text field, for seeding the field editor and rendering
pub fn field_value_text(state: &ModalState, field: Field, config: &BoardConfig) -> String {
    let s = &state.scratch;
    match field {
        Field::SuccessFactors => s.success_factors.clone(),
        Field::ExperienceNote => s.experience_note.clone(),
        Field::Cause(i) => s.causes.get(i).cloned().unwrap_or_default(),
        Field::Improvement(i) => s.improvements.get(i).cloned().unwrap_or_default(),
        Field::DisruptionScenario(i) => s
            .disruptions
            .get(i)
            .map(|d| d.scenario.clone())
            .unwrap_or_default(),
        Field::DisruptionWorkaround(i) => s
            .disruptions
            .get(i)
            .map(|d| d.workaround.clone())
            .unwrap_or_default(),
        Field::DefItem(i) => s
            .input_definitions
            .get(i)
            .map(|d| d.item.clone())
            .unwrap_or_default(),
        Field::DefSpec(i) => s
            .input_definitions
            .get(i)
            .map(|d| d.specifications.clone())
            .unwrap_or_default(),
        Field::QaNote(i) => config
            .criteria
            .get(i)
            .and_then(|c| s.qa.get(&c.key))
            .map(|e| e.note.clone())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn commit_field_text(state: &mut ModalState, config: &BoardConfig, text: String) {
    match fields_for_cursor(state, config) {
        Some(Field::SuccessFactors) => state.scratch.success_factors = text,
        Some(Field::ExperienceNote) => state.scratch.experience_note = text,
        Some(Field::Cause(i)) => {
            if let Some(slot) = state.scratch.causes.get_mut(i) {
                *slot = text;
            }
        }
        Some(Field::Improvement(i)) => {
            if let Some(slot) = state.scratch.improvements.get_mut(i) {
                *slot = text;
            }
        }
        Some(Field::DisruptionScenario(i)) => {
            if let Some(d) = state.scratch.disruptions.get_mut(i) {
                d.scenario = text;
            }
        }
        Some(Field::DisruptionWorkaround(i)) => {
            if let Some(d) = state.scratch.disruptions.get_mut(i) {
                d.workaround = text;
            }
        }
        Some(Field::DefItem(i)) => {
            if let Some(d) = state.scratch.input_definitions.get_mut(i) {
                d.item = text;
            }
        }
        Some(Field::DefSpec(i)) => {
            if let Some(d) = state.scratch.input_definitions.get_mut(i) {
                d.specifications = text;
            }
        }
        Some(Field::QaNote(i)) => {
            if let Some(criterion) = config.criteria.get(i) {
                state.scratch.qa.entry(criterion.key.clone()).or_default().note = text;
            }
        }
        _ => {}
    }
}

fn fields_for_cursor(state: &ModalState, config: &BoardConfig) -> Option<Field> {
    fields_for(state, config).get(state.cursor).copied()
}

fn add_row(state: &mut ModalState, field: Field) {
    match field {
        Field::AddCause => state.scratch.causes.push(String::new()),
        Field::AddImprovement => state.scratch.improvements.push(String::new()),
        Field::AddDisruption => state.scratch.disruptions.push(Disruption::default()),
        Field::AddDefinition => state.scratch.input_definitions.push(Definition::default()),
        _ => {}
    }
}

fn remove_row(state: &mut ModalState, field: Field) {
    match field {
        Field::Cause(i) => {
            if state.scratch.causes.len() > 1 {
                state.scratch.causes.remove(i);
            }
        }
        Field::Improvement(i) => {
            if state.scratch.improvements.len() > 1 {
                state.scratch.improvements.remove(i);
            }
        }
        Field::DisruptionScenario(i)
        | Field::DisruptionFrequency(i)
        | Field::DisruptionWorkaround(i) => {
            if state.scratch.disruptions.len() > 1 {
                state.scratch.disruptions.remove(i);
            }
        }
        Field::DefItem(i) | Field::DefSpec(i) | Field::DefKind(i) => {
            if state.scratch.input_definitions.len() > 1 {
                state.scratch.input_definitions.remove(i);
            }
        }
        _ => {}
    }
}

/// Advance an optional selection through `options`, with None in the cycle
/// so re-selecting eventually clears.
fn cycle_option<T: Copy + PartialEq>(
    current: Option<T>,
    options: &[T],
    direction: isize,
) -> Option<T> {
    let len = options.len() as isize + 1;
    let pos = match current {
        None => 0,
        Some(v) => options
            .iter()
            .position(|o| *o == v)
            .map(|i| i as isize + 1)
            .unwrap_or(0),
    };
    let next = (pos + direction).rem_euclid(len);
    if next == 0 {
        None
    } else {
        Some(options[(next - 1) as usize])
    }
}

/// String-valued variant of `cycle_option`
fn cycle_choice(current: Option<&str>, options: &[String], direction: isize) -> Option<String> {
    let len = options.len() as isize + 1;
    let pos = match current {
        None => 0,
        Some(v) => options
            .iter()
            .position(|o| o == v)
            .map(|i| i as isize + 1)
            .unwrap_or(0),
    };
    let next = (pos + direction).rem_euclid(len);
    if next == 0 {
        None
    } else {
        Some(options[(next - 1) as usize].clone())
    }
}

fn cycle_field(state: &mut ModalState, config: &BoardConfig, field: Field, direction: isize) {
    let s = &mut state.scratch;
    match field {
        Field::Status => {
            s.process_status = cycle_option(
                s.process_status,
                &[
                    ProcessStatus::Happy,
                    ProcessStatus::Neutral,
                    ProcessStatus::Sad,
                ],
                direction,
            );
        }
        Field::Kind => {
            s.kind = cycle_option(
                s.kind,
                &[
                    ActivityType::Task,
                    ActivityType::Appointment,
                    ActivityType::Decision,
                    ActivityType::Wait,
                ],
                direction,
            );
        }
        Field::Lean => {
            s.process_value = cycle_option(
                s.process_value,
                &[LeanValue::VA, LeanValue::BNVA, LeanValue::NVA],
                direction,
            );
        }
        Field::Experience => {
            s.experience = cycle_option(
                s.experience,
                &[
                    ExperienceTag::Obstacle,
                    ExperienceTag::Routine,
                    ExperienceTag::Flow,
                ],
                direction,
            );
        }
        Field::DisruptionFrequency(i) => {
            if let Some(d) = s.disruptions.get_mut(i) {
                d.frequency = cycle_choice(
                    d.frequency.as_deref(),
                    &config.disruption_frequencies,
                    direction,
                );
            }
        }
        Field::Link => {
            let ids: Vec<String> = state.outputs.iter().map(|(id, _)| id.clone()).collect();
            s.linked_source_id = cycle_choice(s.linked_source_id.as_deref(), &ids, direction);
        }
        Field::DefKind(i) => {
            if let Some(d) = s.input_definitions.get_mut(i) {
                d.kind = cycle_option(
                    d.kind,
                    &[DefinitionKind::Hard, DefinitionKind::Soft],
                    direction,
                );
            }
        }
        Field::QaResult(i) => {
            if let Some(criterion) = config.criteria.get(i) {
                let entry = s.qa.entry(criterion.key.clone()).or_default();
                entry.result = cycle_option(
                    entry.result,
                    &[QaResult::Ok, QaResult::NotOk, QaResult::NotApplicable],
                    direction,
                );
            }
        }
        Field::SystemAnswer(i) => {
            if let Some(question) = config.system_questions.get(i) {
                let entry = s.system_data.answers.entry(question.id.clone()).or_insert(None);
                *entry = cycle_option(*entry, &[0, 1, 2, 3], direction);
            }
        }
        _ => {}
    }
}

/// Direct option pick; picking the already-selected option clears it
fn toggle_system_answer(state: &mut ModalState, config: &BoardConfig, question: usize, value: u8) {
    if let Some(q) = config.system_questions.get(question) {
        let entry = state
            .scratch
            .system_data
            .answers
            .entry(q.id.clone())
            .or_insert(None);
        *entry = if *entry == Some(value) {
            None
        } else {
            Some(value)
        };
    }
}

/// Convert the scratch slot into the row's patch shape
fn build_patch(state: &ModalState) -> SlotPatch {
    let s = &state.scratch;
    match state.row {
        Row::Process => SlotPatch::Process {
            status: s.process_status,
            kind: s.kind,
            process_value: s.process_value,
            success_factors: s.success_factors.clone(),
            causes: s.causes.clone(),
            improvements: s.improvements.clone(),
            disruptions: s.disruptions.clone(),
            experience: s.experience,
            experience_note: s.experience_note.clone(),
        },
        Row::System => SlotPatch::System {
            answers: s.system_data.answers.clone(),
        },
        _ => SlotPatch::Io {
            linked_source_id: s.linked_source_id.clone(),
            definitions: s.input_definitions.clone(),
            qa: s.qa.clone(),
        },
    }
}

fn sync_and_switch(app: &mut App, state: ModalState, direction: isize) {
    let patch = build_patch(&state);
    app.store.save_slot_details(state.col, state.row, patch);
    app.mode = Mode::Navigate;
    switch_sheet(app, direction);
    app.status("details saved", Severity::Success);
}

fn save_modal(app: &mut App, state: ModalState) {
    let patch = build_patch(&state);
    app.store.save_slot_details(state.col, state.row, patch);
    app.mode = Mode::Navigate;
    app.status("details saved", Severity::Success);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Slot;
    use crate::store::Store;
    use std::path::PathBuf;

    fn process_state(config: &BoardConfig, status: Option<ProcessStatus>) -> ModalState {
        let mut scratch = Slot::new(config);
        scratch.process_status = status;
        scratch.causes.push(String::new());
        scratch.improvements.push(String::new());
        scratch.disruptions.push(Disruption::default());
        ModalState {
            col: 0,
            row: Row::Process,
            scratch,
            tab: 0,
            cursor: 0,
            scroll: 0,
            field_edit: None,
            outputs: Vec::new(),
        }
    }

    #[test]
    fn happy_step_offers_success_factors_and_no_analysis_tabs() {
        let config = BoardConfig::default();
        let state = process_state(&config, Some(ProcessStatus::Happy));
        assert_eq!(state.tab_labels(), ["Step"]);
        assert!(fields_for(&state, &config).contains(&Field::SuccessFactors));
    }

    #[test]
    fn sad_step_swaps_success_factors_for_analysis_tabs() {
        let config = BoardConfig::default();
        for status in [ProcessStatus::Sad, ProcessStatus::Neutral] {
            let mut state = process_state(&config, Some(status));
            assert_eq!(state.tab_labels(), ["Step", "Analysis", "Disruptions"]);
            assert!(!fields_for(&state, &config).contains(&Field::SuccessFactors));
            state.tab = 1;
            assert!(fields_for(&state, &config).contains(&Field::Cause(0)));
            state.tab = 2;
            assert!(fields_for(&state, &config).contains(&Field::DisruptionScenario(0)));
        }
    }

    #[test]
    fn unset_status_hides_both_sections() {
        let config = BoardConfig::default();
        let state = process_state(&config, None);
        assert_eq!(state.tab_labels(), ["Step"]);
        assert!(!fields_for(&state, &config).contains(&Field::SuccessFactors));
    }

    #[test]
    fn apply_key_commits_the_scratch_without_closing() {
        let mut app = App::new(
            Store::new(BoardConfig::default()),
            PathBuf::from("sipoc.json"),
        );
        open_modal(&mut app, 0, Row::Process);
        if let Some(state) = &mut app.modal {
            state.scratch.process_status = Some(ProcessStatus::Happy);
            state.scratch.success_factors = "clear handoffs".into();
        }

        handle_modal(
            &mut app,
            KeyEvent::new(KeyCode::Char('S'), KeyModifiers::NONE),
        );

        assert_eq!(app.mode, Mode::Modal);
        assert!(app.modal.is_some());
        let slot = app.store.project().active_sheet().columns[0].slot(Row::Process);
        assert_eq!(slot.process_status, Some(ProcessStatus::Happy));
        assert_eq!(slot.success_factors, "clear handoffs");
    }
}
