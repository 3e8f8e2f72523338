use chrono::{NaiveDate, Weekday};
use std::collections::BTreeSet;
use taskboard_core::{
    parse_wall_clock, RepeatMask, Schedule, Task, TaskDraft, TaskValidationError, UserId,
};
use uuid::Uuid;

fn at(text: &str) -> chrono::NaiveDateTime {
    parse_wall_clock(text).unwrap()
}

#[test]
fn task_new_defaults_to_pending_one_time() {
    let task = Task::new(
        UserId::new("emp"),
        "hello",
        at("2024-03-05T09:00"),
        at("2024-03-05T10:00"),
    );

    assert!(!task.id.is_nil());
    assert_eq!(task.schedule, Schedule::OneTime { completed: false });
    assert_eq!(task.description, "");
    assert_eq!(task.assigned_to, None);
    assert!(task.validate().is_ok());
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Task::with_id(
        Uuid::nil(),
        UserId::new("emp"),
        "invalid",
        at("2024-03-05T09:00"),
        at("2024-03-05T10:00"),
    )
    .unwrap_err();
    assert_eq!(err, TaskValidationError::NilId);
}

#[test]
fn validate_rejects_reversed_or_empty_window() {
    let backwards = Task::new(
        UserId::new("emp"),
        "backwards",
        at("2024-03-05T15:00"),
        at("2024-03-05T14:00"),
    );
    assert_eq!(
        backwards.validate().unwrap_err(),
        TaskValidationError::InvalidTimeWindow {
            start: at("2024-03-05T15:00"),
            end: at("2024-03-05T14:00"),
        }
    );

    let zero_length = Task::new(
        UserId::new("emp"),
        "instant",
        at("2024-03-05T15:00"),
        at("2024-03-05T15:00"),
    );
    assert!(matches!(
        zero_length.validate(),
        Err(TaskValidationError::InvalidTimeWindow { .. })
    ));
}

#[test]
fn draft_rejects_blank_title() {
    let draft = TaskDraft::new("   ", at("2024-03-05T09:00"), at("2024-03-05T10:00"));
    assert_eq!(
        draft.into_task(UserId::new("emp")).unwrap_err(),
        TaskValidationError::EmptyTitle
    );
}

#[test]
fn draft_with_repeat_days_becomes_weekly() {
    let mut draft = TaskDraft::new("sweep", at("2024-03-05T09:00"), at("2024-03-05T10:00"));
    draft.repeat_mask = RepeatMask::from_weekdays([Weekday::Tue]);
    let task = draft.into_task(UserId::new("emp")).unwrap();
    assert!(task.is_recurring());
    assert_eq!(task.employer_id, UserId::new("emp"));
}

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut task = Task::with_id(
        id,
        UserId::new("emp-1"),
        "mop floor",
        at("2024-03-11T09:00"),
        at("2024-03-11T09:45"),
    )
    .unwrap()
    .with_schedule(Schedule::Weekly {
        repeat_mask: RepeatMask::from_weekdays([Weekday::Mon]),
        completed_dates: BTreeSet::from([NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()]),
    });
    task.assigned_to = Some(UserId::new("help-1"));

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["start"], "2024-03-11T09:00:00");
    assert_eq!(json["employer_id"], "emp-1");
    assert_eq!(json["assigned_to"], "help-1");
    assert_eq!(json["schedule"]["kind"], "weekly");
    assert_eq!(
        json["schedule"]["repeat_mask"],
        serde_json::json!([true, false, false, false, false, false, false])
    );
    assert_eq!(
        json["schedule"]["completed_dates"],
        serde_json::json!(["2024-03-11"])
    );

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}
