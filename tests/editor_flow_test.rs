//! End-to-end flows through the list editor with the real metric form

use playbook_metrics::domain::{format_target, parse_target, Metric, MetricType, MAX_METRICS};
use playbook_metrics::editor::{
    CloseOutcome, DeleteWarning, EditorError, FollowUp, MetricListEditor, PendingPolicy,
    PendingTask, RequestOutcome,
};
use playbook_metrics::modules::{FormError, FormField, MetricForm};

fn metric(title: &str, metric_type: MetricType) -> Metric {
    Metric {
        title: title.to_string(),
        ..Metric::new(metric_type)
    }
}

fn seeded(titles: &[&str]) -> MetricListEditor {
    let metrics = titles
        .iter()
        .map(|title| metric(title, MetricType::Integer))
        .collect();
    MetricListEditor::new(metrics, PendingPolicy::Replace)
}

fn open_form(editor: &MetricListEditor) -> MetricForm {
    let index = editor.editing_index().expect("a row is open");
    MetricForm::new(index, &editor.metrics()[index], editor.other_titles(index))
}

#[test]
fn add_waits_for_open_edit_then_opens_new_row() {
    let mut editor = seeded(&["Pages sent", "Responders", "Customers affected"]);
    editor.request_edit(2).unwrap();
    let mut form = open_form(&editor);
    form.set_value(FormField::Target, "250");

    let outcome = editor.request_add(MetricType::Duration).unwrap();
    assert_eq!(outcome, RequestOutcome::Queued { replaced: None });
    assert_eq!(editor.len(), 3);

    let saved = match editor.close_active(&mut form).unwrap() {
        CloseOutcome::Saved(saved) => saved,
        CloseOutcome::Rejected { error, .. } => panic!("form rejected: {error}"),
    };
    assert_eq!(saved.index, 2);
    assert_eq!(
        saved.follow_up,
        FollowUp::Ran {
            task: PendingTask::AddMetric(MetricType::Duration),
            outcome: RequestOutcome::Applied,
        }
    );
    assert_eq!(editor.metrics()[2].target, 250);
    assert_eq!(editor.len(), 4);
    assert_eq!(editor.editing_index(), Some(3));
    assert_eq!(editor.metrics()[3].metric_type, MetricType::Duration);
    assert_eq!(editor.pending_task(), None);
}

#[test]
fn deleting_the_open_row_skips_the_queue() {
    let mut editor = seeded(&["A", "B"]);
    editor.request_edit(1).unwrap();

    let outcome = editor.request_delete(1).unwrap();
    assert_eq!(outcome, RequestOutcome::ConfirmDelete(DeleteWarning::Draft));
    assert_eq!(editor.pending_deletion(), Some(1));
    assert_eq!(editor.pending_task(), None);
}

#[test]
fn failed_save_discards_queued_request_and_cancel_closes() {
    let mut editor = seeded(&["A", "B"]);
    editor.request_edit(0).unwrap();
    let mut form = open_form(&editor);
    form.set_value(FormField::Title, "");
    editor.request_edit(1).unwrap();

    match editor.close_active(&mut form).unwrap() {
        CloseOutcome::Rejected { error, dropped } => {
            assert_eq!(error, FormError::TitleRequired);
            assert_eq!(dropped, Some(PendingTask::EditMetric(1)));
        }
        CloseOutcome::Saved(_) => panic!("empty title must not save"),
    }
    assert_eq!(editor.editing_index(), Some(0));

    assert_eq!(editor.on_editor_cancelled(), None);
    assert_eq!(editor.editing_index(), None);
    assert_eq!(editor.metrics()[0].title, "A");
}

#[test]
fn delete_warning_depends_on_persistence() {
    let persisted = Metric {
        id: "4f1c".to_string(),
        ..metric("Saved", MetricType::Currency)
    };
    let mut editor = MetricListEditor::new(
        vec![metric("Draft", MetricType::Integer), persisted],
        PendingPolicy::Replace,
    );

    editor.request_delete(0).unwrap();
    let short = editor.pending_warning().unwrap();
    assert_eq!(short, DeleteWarning::Draft);
    editor.cancel_delete();

    editor.request_delete(1).unwrap();
    let extended = editor.pending_warning().unwrap();
    assert_eq!(extended, DeleteWarning::Persisted);
    assert!(extended.message().starts_with(&short.message()));
    assert!(extended.message().contains("historical data"));

    let removed = editor.confirm_delete().unwrap();
    assert_eq!(removed.title, "Saved");
    assert!(editor.changes_made());
}

#[test]
fn list_never_exceeds_cap() {
    let mut editor = seeded(&[]);
    for _ in 0..MAX_METRICS {
        editor.request_add(MetricType::Integer).unwrap();
        editor.on_editor_cancelled();
    }
    assert_eq!(editor.len(), MAX_METRICS);
    assert_eq!(
        editor.request_add(MetricType::Integer),
        Err(EditorError::ListFull { max: MAX_METRICS })
    );
    assert_eq!(editor.len(), MAX_METRICS);
}

#[test]
fn reject_policy_keeps_first_queued_request() {
    let mut editor = seeded(&["A", "B", "C"]);
    editor.set_policy(PendingPolicy::Reject);
    editor.request_edit(0).unwrap();
    editor.request_delete(2).unwrap();

    let err = editor.request_edit(1).unwrap_err();
    assert_eq!(
        err,
        EditorError::Busy {
            pending: PendingTask::DeleteMetric(2)
        }
    );
    assert!(err.to_string().contains("delete metric 3"));
}

#[test]
fn replace_policy_reports_overwritten_request() {
    let mut editor = seeded(&["A", "B", "C"]);
    editor.request_edit(0).unwrap();
    editor.request_delete(2).unwrap();
    assert_eq!(
        editor.request_edit(1),
        Ok(RequestOutcome::Queued {
            replaced: Some(PendingTask::DeleteMetric(2))
        })
    );
    assert_eq!(editor.pending_task(), Some(PendingTask::EditMetric(1)));
}

#[test]
fn target_formatting_examples() {
    assert_eq!(format_target(0, MetricType::Duration), "00:00:00");
    assert_eq!(format_target(0, MetricType::Integer), "0");
    assert_eq!(format_target(90_000, MetricType::Duration), "00:00:01");
    assert_eq!(format_target(90_000_000, MetricType::Duration), "01:01:00");
    assert_eq!(parse_target("01:01:00", MetricType::Duration), Ok(90_000_000));
    assert_eq!(parse_target("", MetricType::Currency), Ok(0));
}
