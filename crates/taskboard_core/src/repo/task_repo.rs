//! Task store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/update/list/delete over canonical `tasks` storage.
//! - Persist completion patches produced by the engine.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Listing returns tasks in creation order, oldest first.
//! - Listing skips rows with unparsable instants instead of failing the whole
//!   snapshot; single-task reads report them as `InvalidData`.
//! - One-time rows ignore completion-date rows and weekly rows ignore the
//!   `completed` column.

use crate::db::DbError;
use crate::engine::completion::TaskPatch;
use crate::model::task::{
    format_date_key, format_wall_clock, parse_date_key, parse_wall_clock, RepeatMask, Schedule,
    Task, TaskId, TaskValidationError, UserId,
};
use crate::model::viewer::ViewerScope;
use chrono::NaiveDate;
use log::warn;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    start_at,
    end_at,
    completed,
    repeat_mask,
    employer_id,
    assigned_to
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
    /// A completion patch targeted the other task kind.
    PatchKindMismatch(TaskId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::PatchKindMismatch(id) => {
                write!(f, "completion patch does not match task kind: {id}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::PatchKindMismatch(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Task store interface consumed by the board service.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Replaces every stored field of an existing task.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists the viewer's tasks, oldest first.
    fn list_tasks(&self, scope: &ViewerScope) -> RepoResult<Vec<Task>>;
    /// Persists a completion delta.
    fn apply_patch(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<()>;
    /// Marks or clears one date of a weekly task, leaving its other dates
    /// as currently stored.
    fn set_occurrence_done(&self, id: TaskId, date: NaiveDate, done: bool) -> RepoResult<()>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task store.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                start_at,
                end_at,
                completed,
                repeat_mask,
                employer_id,
                assigned_to
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_str(),
                format_wall_clock(task.start),
                format_wall_clock(task.end),
                completed_column(&task.schedule),
                task.schedule.repeat_mask().map(repeat_mask_to_db),
                task.employer_id.as_str(),
                task.assigned_to.as_ref().map(UserId::as_str),
            ],
        )?;
        if let Schedule::Weekly {
            completed_dates, ..
        } = &task.schedule
        {
            replace_completed_dates(&tx, task.id, completed_dates)?;
        }
        tx.commit()?;

        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                start_at = ?3,
                end_at = ?4,
                completed = ?5,
                repeat_mask = ?6,
                employer_id = ?7,
                assigned_to = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?9;",
            params![
                task.title.as_str(),
                task.description.as_str(),
                format_wall_clock(task.start),
                format_wall_clock(task.end),
                completed_column(&task.schedule),
                task.schedule.repeat_mask().map(repeat_mask_to_db),
                task.employer_id.as_str(),
                task.assigned_to.as_ref().map(UserId::as_str),
                task.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }

        let completed_dates = match &task.schedule {
            Schedule::OneTime { .. } => BTreeSet::new(),
            Schedule::Weekly {
                completed_dates, ..
            } => completed_dates.clone(),
        };
        replace_completed_dates(&tx, task.id, &completed_dates)?;
        tx.commit()?;

        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.hydrate(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, scope: &ViewerScope) -> RepoResult<Vec<Task>> {
        let (filter, bindings) = match scope {
            ViewerScope::OwnedBy(employer_id) => ("employer_id = ?1", vec![employer_id.as_str()]),
            ViewerScope::AssignedTo {
                helper_id,
                employer_id,
            } => (
                "assigned_to = ?1 AND employer_id = ?2",
                vec![helper_id.as_str(), employer_id.as_str()],
            ),
        };
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE {filter} ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(bindings))?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            match self.hydrate(row) {
                Ok(task) => tasks.push(task),
                Err(RepoError::InvalidData(message)) => {
                    warn!(
                        "event=task_row_skipped module=repo status=warn reason=\"{}\"",
                        message
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(tasks)
    }

    fn apply_patch(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        match (patch, is_weekly_row(&tx, id)?) {
            (TaskPatch::Completed(completed), false) => {
                tx.execute(
                    "UPDATE tasks
                     SET
                        completed = ?1,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?2;",
                    params![bool_to_int(*completed), id.to_string()],
                )?;
            }
            (TaskPatch::CompletedDates(dates), true) => {
                replace_completed_dates(&tx, id, dates)?;
                tx.execute(
                    "UPDATE tasks
                     SET updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?1;",
                    [id.to_string()],
                )?;
            }
            _ => return Err(RepoError::PatchKindMismatch(id)),
        }
        tx.commit()?;

        Ok(())
    }

    fn set_occurrence_done(&self, id: TaskId, date: NaiveDate, done: bool) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !is_weekly_row(&tx, id)? {
            return Err(RepoError::PatchKindMismatch(id));
        }

        let sql = if done {
            "INSERT OR IGNORE INTO task_completed_dates (task_id, occurrence_date)
             VALUES (?1, ?2);"
        } else {
            "DELETE FROM task_completed_dates
             WHERE task_id = ?1 AND occurrence_date = ?2;"
        };
        tx.execute(sql, params![id.to_string(), format_date_key(date)])?;
        tx.execute(
            "UPDATE tasks
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id.to_string()],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

impl SqliteTaskRepository<'_> {
    fn hydrate(&self, row: &Row<'_>) -> RepoResult<Task> {
        let mut task = parse_task_row(row)?;
        if let Schedule::Weekly {
            completed_dates, ..
        } = &mut task.schedule
        {
            *completed_dates = load_completed_dates(self.conn, task.id)?;
        }
        Ok(task)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid task id `{id_text}` in tasks.id"))
    })?;

    let start_text: String = row.get("start_at")?;
    let start = parse_wall_clock(&start_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "unparsable start `{start_text}` for task {id_text}"
        ))
    })?;
    let end_text: String = row.get("end_at")?;
    let end = parse_wall_clock(&end_text).ok_or_else(|| {
        RepoError::InvalidData(format!("unparsable end `{end_text}` for task {id_text}"))
    })?;

    let schedule = match row.get::<_, Option<String>>("repeat_mask")? {
        Some(mask_text) => {
            let repeat_mask = parse_repeat_mask(&mask_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid repeat mask `{mask_text}` for task {id_text}"
                ))
            })?;
            Schedule::weekly(repeat_mask)
        }
        None => Schedule::OneTime {
            completed: int_to_bool(row.get("completed")?).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid completed flag for task {id_text}"))
            })?,
        },
    };

    Ok(Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        start,
        end,
        employer_id: UserId::new(row.get::<_, String>("employer_id")?),
        assigned_to: row
            .get::<_, Option<String>>("assigned_to")?
            .map(UserId::new),
        schedule,
    })
}

fn load_completed_dates(conn: &Connection, id: TaskId) -> RepoResult<BTreeSet<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT occurrence_date
         FROM task_completed_dates
         WHERE task_id = ?1
         ORDER BY occurrence_date ASC;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;

    let mut dates = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        match parse_date_key(&text) {
            Some(date) => {
                dates.insert(date);
            }
            None => warn!(
                "event=completion_row_skipped module=repo status=warn task_id={} value=\"{}\"",
                id, text
            ),
        }
    }
    Ok(dates)
}

/// Task kind as stored: weekly rows carry a repeat mask.
fn is_weekly_row(tx: &Transaction<'_>, id: TaskId) -> RepoResult<bool> {
    let repeat_mask: Option<String> = tx
        .query_row(
            "SELECT repeat_mask FROM tasks WHERE id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(RepoError::NotFound(id))?;
    Ok(repeat_mask.is_some())
}

fn replace_completed_dates(
    tx: &Transaction<'_>,
    id: TaskId,
    dates: &BTreeSet<NaiveDate>,
) -> RepoResult<()> {
    let id_text = id.to_string();
    tx.execute(
        "DELETE FROM task_completed_dates WHERE task_id = ?1;",
        [id_text.as_str()],
    )?;
    let mut insert = tx.prepare(
        "INSERT INTO task_completed_dates (task_id, occurrence_date) VALUES (?1, ?2);",
    )?;
    for date in dates {
        insert.execute(params![id_text.as_str(), format_date_key(*date)])?;
    }
    Ok(())
}

fn completed_column(schedule: &Schedule) -> i64 {
    match schedule {
        Schedule::OneTime { completed } => bool_to_int(*completed),
        Schedule::Weekly { .. } => 0,
    }
}

/// Seven `0`/`1` characters, Monday first.
fn repeat_mask_to_db(mask: RepeatMask) -> String {
    mask.days()
        .iter()
        .map(|enabled| if *enabled { '1' } else { '0' })
        .collect()
}

fn parse_repeat_mask(value: &str) -> Option<RepeatMask> {
    if value.len() != 7 {
        return None;
    }
    let mut days = [false; 7];
    for (slot, ch) in days.iter_mut().zip(value.chars()) {
        *slot = match ch {
            '0' => false,
            '1' => true,
            _ => return None,
        };
    }
    Some(RepeatMask::new(days))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_repeat_mask, repeat_mask_to_db};
    use crate::model::task::RepeatMask;
    use chrono::Weekday;

    #[test]
    fn repeat_mask_column_is_monday_first() {
        let mask = RepeatMask::from_weekdays([Weekday::Mon, Weekday::Sat]);
        assert_eq!(repeat_mask_to_db(mask), "1000010");
        assert_eq!(parse_repeat_mask("1000010"), Some(mask));
    }

    #[test]
    fn malformed_repeat_mask_column_is_rejected() {
        assert_eq!(parse_repeat_mask("10"), None);
        assert_eq!(parse_repeat_mask("10000x0"), None);
    }
}
