//! Store-level integration tests: operation sequences, notification
//! batching/throttling, undo history and linked-input behavior.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use sipoc::model::{BoardConfig, ROW_COUNT, Row};
use sipoc::store::{ChangeReason, ChangeSet, SlotPatch, Store, derive};

fn fresh_store() -> Store {
    Store::new(BoardConfig::default())
}

/// Record every delivered changeset for later inspection
fn record(store: &mut Store) -> Rc<RefCell<Vec<ChangeSet>>> {
    let log: Rc<RefCell<Vec<ChangeSet>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    store.subscribe(Box::new(move |_, change| {
        sink.borrow_mut().push(change.clone());
    }));
    log
}

#[test]
fn typing_burst_coalesces_to_one_notification() {
    let mut store = fresh_store();
    let log = record(&mut store);

    let mut text = String::new();
    for i in 0..50 {
        text = format!("draft {}", i);
        store.update_sticky_text(0, Row::Process, &text);
    }
    assert_eq!(log.borrow().len(), 0, "throttled reasons wait for the frame");

    assert!(store.flush());
    assert_eq!(log.borrow().len(), 1);
    assert!(log.borrow()[0].contains(ChangeReason::Text {
        col: 0,
        row: Row::Process
    }));
    assert_eq!(
        store.project().active_sheet().columns[0]
            .slot(Row::Process)
            .text,
        text
    );

    // Nothing pending afterwards
    assert!(!store.flush());
}

#[test]
fn immediate_change_drains_pending_typing_first() {
    let mut store = fresh_store();
    let log = record(&mut store);

    store.update_sticky_text(0, Row::Input, "order form");
    store.add_column(None);

    // The pending text edit rides along with the structural change so a
    // listener never sees them out of order.
    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert!(log[0].contains(ChangeReason::Text {
        col: 0,
        row: Row::Input
    }));
    assert!(log[0].contains(ChangeReason::Structure));

    assert!(!store.flush());
}

#[test]
fn batch_delivers_one_merged_changeset() {
    let mut store = fresh_store();
    let log = record(&mut store);

    store.begin_batch();
    store.add_column(None);
    store.toggle_parallel(1);
    store.set_col_visibility(1, false);
    store.end_batch();

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert!(log[0].contains(ChangeReason::Structure));
    assert!(log[0].contains(ChangeReason::Visibility));
}

#[test]
fn column_lifecycle_keeps_board_invariants() {
    let mut store = fresh_store();

    store.add_column(None);
    store.add_column(Some(0));
    assert_eq!(store.project().active_sheet().columns.len(), 3);
    for column in &store.project().active_sheet().columns {
        assert_eq!(column.slots.len(), ROW_COUNT);
    }

    store.update_sticky_text(0, Row::Input, "first");
    store.update_sticky_text(2, Row::Input, "third");
    let ids = derive::assign_ids(store.project());
    assert_eq!(ids[0].as_ref().unwrap().input.as_deref(), Some("IN1"));
    assert!(ids[1].as_ref().unwrap().input.is_none());
    assert_eq!(ids[2].as_ref().unwrap().input.as_deref(), Some("IN2"));

    store.delete_column(1).unwrap();
    assert_eq!(store.project().active_sheet().columns.len(), 2);
}

#[test]
fn last_column_and_sheet_are_guarded() {
    let mut store = fresh_store();

    assert!(store.delete_column(0).is_err());
    assert!(store.delete_sheet().is_err());
    assert_eq!(store.project().sheets.len(), 1);
    assert_eq!(store.project().active_sheet().columns.len(), 1);
}

#[test]
fn move_column_there_and_back_restores_order() {
    let mut store = fresh_store();
    store.add_column(None);
    store.update_sticky_text(0, Row::Process, "check");
    store.update_sticky_text(1, Row::Process, "ship");

    let before = store.project().active_sheet().columns.clone();
    store.move_column(0, 1);
    assert_eq!(
        store.project().active_sheet().columns[1]
            .slot(Row::Process)
            .text,
        "check"
    );
    store.move_column(1, -1);
    assert_eq!(store.project().active_sheet().columns, before);

    // Out-of-range moves are no-ops
    store.move_column(1, 1);
    store.move_column(0, -1);
    assert_eq!(store.project().active_sheet().columns, before);
}

#[test]
fn structural_undo_skips_typing() {
    let mut store = fresh_store();

    store.add_column(None);
    store.update_sticky_text(1, Row::Output, "invoice");
    store.flush();

    // Undo reverts the column add; the typing never made a snapshot of its
    // own, so one undo is enough.
    assert!(store.undo());
    assert_eq!(store.project().active_sheet().columns.len(), 1);

    // Redo restores the state parked by undo, typing included
    assert!(store.redo());
    assert_eq!(store.project().active_sheet().columns.len(), 2);
    assert_eq!(
        store.project().active_sheet().columns[1]
            .slot(Row::Output)
            .text,
        "invoice"
    );
    assert!(store.can_undo());
}

#[test]
fn undo_exhaustion_reports_false() {
    let mut store = fresh_store();
    assert!(!store.undo());
    assert!(!store.redo());
}

#[test]
fn sheet_rename_and_guards() {
    let mut store = fresh_store();
    store.rename_sheet("Intake");
    assert_eq!(store.project().active_sheet().name, "Intake");

    // Empty and unchanged names are no-ops
    store.rename_sheet("   ");
    assert_eq!(store.project().active_sheet().name, "Intake");
}

#[test]
fn add_sheet_activates_and_numbers_it() {
    let mut store = fresh_store();
    store.add_sheet(None);
    assert_eq!(store.project().sheets.len(), 2);
    assert_eq!(store.project().active_sheet_index(), 1);
    assert_eq!(store.project().active_sheet().name, "Process 2");

    store.delete_sheet().unwrap();
    assert_eq!(store.project().active_sheet_index(), 0);
}

#[test]
fn linked_input_mirrors_source_and_refuses_edits() {
    let mut store = fresh_store();
    store.add_column(None);
    store.update_sticky_text(0, Row::Output, "signed contract");

    // Link the second column's input to OUT1
    let slot = store.project().active_sheet().columns[1]
        .slot(Row::Input)
        .clone();
    store.save_slot_details(
        1,
        Row::Input,
        SlotPatch::Io {
            linked_source_id: Some("OUT1".into()),
            definitions: slot.input_definitions.clone(),
            qa: slot.qa.clone(),
        },
    );

    let outputs = store.all_outputs();
    let project = store.project();
    let linked = project.active_sheet().columns[1].slot(Row::Input);
    let (text, is_linked) = derive::display_text(linked, Row::Input, &outputs);
    assert_eq!(text, "signed contract");
    assert!(is_linked);

    // The link shows the OUT id instead of minting an IN id
    let ids = derive::assign_ids(project);
    let col_ids = ids[1].as_ref().unwrap();
    assert_eq!(col_ids.input.as_deref(), Some("OUT1"));
    assert!(col_ids.input_linked);

    // Inline edits on the linked input are silently refused
    store.update_sticky_text(1, Row::Input, "overwritten");
    store.flush();
    assert_eq!(
        store.project().active_sheet().columns[1]
            .slot(Row::Input)
            .text,
        ""
    );

    // Source edits propagate through the derived display text
    store.update_sticky_text(0, Row::Output, "countersigned contract");
    store.flush();
    let outputs = store.all_outputs();
    let (text, _) = derive::display_text(
        store.project().active_sheet().columns[1].slot(Row::Input),
        Row::Input,
        &outputs,
    );
    assert_eq!(text, "countersigned contract");
}

#[test]
fn detail_save_recomputes_system_score() {
    let mut store = fresh_store();
    let config = store.config().clone();

    let mut answers = store.project().active_sheet().columns[0]
        .slot(Row::System)
        .system_data
        .answers
        .clone();
    for (i, value) in answers.values_mut().enumerate() {
        *value = Some((i % 4) as u8);
    }
    store.save_slot_details(0, Row::System, SlotPatch::System { answers: answers.clone() });

    let slot = store.project().active_sheet().columns[0].slot(Row::System);
    assert_eq!(
        slot.system_data.calculated_score,
        derive::system_score(&answers, &config)
    );
    assert!(slot.system_data.calculated_score.is_some());
}

#[test]
fn title_updates_skip_history() {
    let mut store = fresh_store();
    store.update_project_title("Claims Intake");
    store.flush();
    assert_eq!(store.project().title, "Claims Intake");
    assert!(!store.can_undo());
}
