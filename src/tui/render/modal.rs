use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::BoardConfig;
use crate::tui::app::{App, ModalState};
use crate::tui::input::{Field, fields_for};
use crate::util::text::truncate_to_width;

use super::{caret_line, centered_rect_fixed};

const POPUP_WIDTH: u16 = 64;
const LABEL_WIDTH: usize = 20;

/// Render the cell detail editor popup over the board
pub fn render_modal(frame: &mut Frame, app: &mut App, area: Rect) {
    let config = app.store.config().clone();
    let Some(state) = &mut app.modal else {
        return;
    };

    let fields = fields_for(state, &config);
    let popup_w = POPUP_WIDTH.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(2) as usize;

    // Chrome inside the border: tab line, blank, fields, blank, footer
    let max_h = area.height.saturating_sub(2);
    let popup_h = ((fields.len() as u16) + 6).min(max_h);
    let list_h = popup_h.saturating_sub(6) as usize;

    // Keep the field cursor inside the scrolled window
    if state.cursor < state.scroll {
        state.scroll = state.cursor;
    }
    if list_h > 0 && state.cursor >= state.scroll + list_h {
        state.scroll = state.cursor + 1 - list_h;
    }

    let theme = &app.theme;
    let bg = theme.background;
    let text_style = Style::default().fg(theme.text).bg(bg);
    let dim_style = Style::default().fg(theme.dim).bg(bg);

    let mut lines: Vec<Line> = Vec::new();

    // Sub-tab header
    let mut tab_spans: Vec<Span> = vec![Span::styled(" ", Style::default().bg(bg))];
    for (i, label) in state.tab_labels().iter().enumerate() {
        let style = if i == state.tab {
            Style::default()
                .fg(theme.text_bright)
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            dim_style
        };
        tab_spans.push(Span::styled(format!(" {} ", label), style));
        tab_spans.push(Span::styled(" ", Style::default().bg(bg)));
    }
    lines.push(Line::from(tab_spans));
    lines.push(Line::default());

    for (i, field) in fields
        .iter()
        .enumerate()
        .skip(state.scroll)
        .take(list_h.max(1))
    {
        let is_cursor = i == state.cursor;
        let editing = is_cursor && state.field_edit.is_some();

        let (label, value) = field_line(state, *field, &config);
        let value = match &state.field_edit {
            Some(edit) if is_cursor => caret_line(&edit.buffer, edit.cursor),
            _ => value,
        };

        let label_style = if is_cursor {
            Style::default()
                .fg(theme.text_bright)
                .bg(theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            dim_style
        };
        let value_style = if editing {
            Style::default().fg(theme.text_bright).bg(theme.selection_bg)
        } else if is_cursor {
            Style::default().fg(theme.text_bright).bg(theme.selection_bg)
        } else {
            text_style
        };

        let padded = format!(
            " {:<width$}",
            truncate_to_width(&label, LABEL_WIDTH),
            width = LABEL_WIDTH
        );
        let room = inner_w.saturating_sub(padded.chars().count() + 1);
        lines.push(Line::from(vec![
            Span::styled(padded, label_style),
            Span::styled(" ", Style::default().bg(bg)),
            Span::styled(truncate_to_width(&value, room), value_style),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        " Tab sections  Enter edit/cycle  S apply  s save  Esc discard",
        dim_style,
    )));

    let title = format!(
        " {} \u{2014} step {} ",
        state.row.label(),
        state.col + 1
    );
    let overlay = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), overlay);
}

/// Label and current value for one field row of the editor
fn field_line(state: &ModalState, field: Field, config: &BoardConfig) -> (String, String) {
    let s = &state.scratch;
    let none = "\u{2014}".to_string();
    match field {
        Field::Status => (
            "Control status".into(),
            s.process_status
                .map(|st| format!("{} {}", st.face(), st.label()))
                .unwrap_or(none),
        ),
        Field::Kind => (
            "Activity type".into(),
            s.kind
                .map(|k| format!("{} {}", k.icon(), k.label()))
                .unwrap_or(none),
        ),
        Field::Lean => (
            "Lean value".into(),
            s.process_value.map(|v| v.label().to_string()).unwrap_or(none),
        ),
        Field::SuccessFactors => ("Success factors".into(), s.success_factors.clone()),
        Field::Experience => (
            "Experience".into(),
            s.experience.map(|e| e.label().to_string()).unwrap_or(none),
        ),
        Field::ExperienceNote => ("Experience note".into(), s.experience_note.clone()),
        Field::Cause(i) => (
            format!("Cause {}", i + 1),
            s.causes.get(i).cloned().unwrap_or_default(),
        ),
        Field::AddCause => ("[ add cause ]".into(), String::new()),
        Field::Improvement(i) => (
            format!("Improvement {}", i + 1),
            s.improvements.get(i).cloned().unwrap_or_default(),
        ),
        Field::AddImprovement => ("[ add improvement ]".into(), String::new()),
        Field::DisruptionScenario(i) => (
            format!("Scenario {}", i + 1),
            s.disruptions
                .get(i)
                .map(|d| d.scenario.clone())
                .unwrap_or_default(),
        ),
        Field::DisruptionFrequency(i) => (
            "\u{2514} frequency".into(),
            s.disruptions
                .get(i)
                .and_then(|d| d.frequency.clone())
                .unwrap_or(none),
        ),
        Field::DisruptionWorkaround(i) => (
            "\u{2514} workaround".into(),
            s.disruptions
                .get(i)
                .map(|d| d.workaround.clone())
                .unwrap_or_default(),
        ),
        Field::AddDisruption => ("[ add disruption ]".into(), String::new()),
        Field::Link => (
            "Source link".into(),
            match &s.linked_source_id {
                Some(id) => {
                    let source = state
                        .outputs
                        .iter()
                        .find(|(out, _)| out == id)
                        .map(|(_, text)| text.as_str())
                        .unwrap_or("");
                    format!("{} \u{2014} {}", id, source)
                }
                None => none,
            },
        ),
        Field::DefItem(i) => (
            format!("Item {}", i + 1),
            s.input_definitions
                .get(i)
                .map(|d| d.item.clone())
                .unwrap_or_default(),
        ),
        Field::DefSpec(i) => (
            "\u{2514} specification".into(),
            s.input_definitions
                .get(i)
                .map(|d| d.specifications.clone())
                .unwrap_or_default(),
        ),
        Field::DefKind(i) => (
            "\u{2514} hard/soft".into(),
            s.input_definitions
                .get(i)
                .and_then(|d| d.kind)
                .map(|k| format!("{:?}", k).to_uppercase())
                .unwrap_or(none),
        ),
        Field::AddDefinition => ("[ add definition ]".into(), String::new()),
        Field::QaResult(i) => {
            let criterion = &config.criteria[i];
            let value = s
                .qa
                .get(&criterion.key)
                .and_then(|e| e.result)
                .map(|r| {
                    match r {
                        crate::model::QaResult::Ok => "OK",
                        crate::model::QaResult::NotOk => "NOT OK",
                        crate::model::QaResult::NotApplicable => "N/A",
                    }
                    .to_string()
                })
                .unwrap_or(none);
            (
                format!("{} (w{})", criterion.label, criterion.weight),
                value,
            )
        }
        Field::QaNote(i) => {
            let criterion = &config.criteria[i];
            (
                "\u{2514} note".into(),
                s.qa.get(&criterion.key)
                    .map(|e| e.note.clone())
                    .unwrap_or_default(),
            )
        }
        Field::SystemAnswer(i) => {
            let question = &config.system_questions[i];
            let value = s
                .system_data
                .answers
                .get(&question.id)
                .copied()
                .flatten()
                .and_then(|v| question.options.get(v as usize).cloned())
                .unwrap_or(none);
            (question.label.clone(), value)
        }
    }
}
