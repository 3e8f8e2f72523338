//! Task board use-case service.
//!
//! # Responsibility
//! - Enforce role rules: employers manage their own tasks, helpers only
//!   toggle completion on tasks assigned to them.
//! - Run the refetch-then-resolve loop: every read builds from a fresh
//!   snapshot, every toggle is computed against the viewer's snapshot.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Toggling an id missing from the snapshot, or a date without an
//!   occurrence, touches no storage.

use crate::engine::board::Board;
use crate::engine::completion::{toggle_in_snapshot, TaskPatch, ToggleOutcome};
use crate::engine::window::ViewGranularity;
use crate::model::task::{
    format_date_key, Task, TaskDraft, TaskId, TaskUpdate, TaskValidationError, UserId,
};
use crate::model::viewer::Viewer;
use crate::repo::task_repo::{RepoError, TaskRepository};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for board use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// The viewer's role does not allow `action` on the target.
    Forbidden {
        user_id: UserId,
        action: &'static str,
    },
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Input failed task validation.
    Validation(TaskValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden { user_id, action } => {
                write!(f, "user {user_id} is not allowed to {action}")
            }
            Self::TaskNotFound(task_id) => write!(f, "task not found: {task_id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(task_id) => Self::TaskNotFound(task_id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Board service facade over a task store.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the viewer's tasks, oldest first.
    pub fn list_tasks(&self, viewer: &Viewer) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.list_tasks(&viewer.scope())?)
    }

    /// Creates a task owned by the viewer.
    ///
    /// # Errors
    /// - `Forbidden` for helpers.
    /// - `Validation` for blank titles, reversed time windows.
    pub fn create_task(
        &self,
        viewer: &Viewer,
        draft: TaskDraft,
    ) -> Result<Task, TaskServiceError> {
        if !viewer.is_employer() {
            return Err(forbidden(viewer, "create tasks"));
        }

        let task = draft.into_task(viewer.user_id.clone())?;
        let task_id = self.repo.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={} recurring={}",
            task_id,
            task.is_recurring()
        );

        self.repo
            .get_task(task_id)?
            .ok_or(TaskServiceError::InconsistentState(
                "created task not found in read-back",
            ))
    }

    /// Applies a partial edit to a task the viewer owns.
    pub fn update_task(
        &self,
        viewer: &Viewer,
        task_id: TaskId,
        update: &TaskUpdate,
    ) -> Result<Task, TaskServiceError> {
        let mut task = self.managed_task(viewer, task_id, "edit this task")?;
        if update.is_empty() {
            return Ok(task);
        }

        update.apply_to(&mut task);
        self.repo.update_task(&task)?;
        info!(
            "event=task_update module=service status=ok task_id={} recurring={}",
            task_id,
            task.is_recurring()
        );

        self.repo
            .get_task(task_id)?
            .ok_or(TaskServiceError::InconsistentState(
                "updated task not found in read-back",
            ))
    }

    /// Deletes a task the viewer owns.
    pub fn delete_task(&self, viewer: &Viewer, task_id: TaskId) -> Result<(), TaskServiceError> {
        self.managed_task(viewer, task_id, "delete this task")?;
        self.repo.delete_task(task_id)?;
        info!("event=task_delete module=service status=ok task_id={task_id}");
        Ok(())
    }

    /// Toggles the done state of one occurrence.
    ///
    /// The lookup runs against the viewer's own snapshot, so helpers can only
    /// toggle tasks assigned to them. An unknown id or a date the task does
    /// not occur on persists nothing. Weekly toggles write only the toggled
    /// date, so dates marked by another writer since the snapshot survive.
    pub fn toggle_completion(
        &self,
        viewer: &Viewer,
        task_id: TaskId,
        date: NaiveDate,
    ) -> Result<ToggleOutcome, TaskServiceError> {
        let snapshot = self.repo.list_tasks(&viewer.scope())?;
        let outcome = toggle_in_snapshot(&snapshot, task_id, date);

        match &outcome {
            ToggleOutcome::Patched {
                task_id,
                patch: patch @ TaskPatch::Completed(_),
            } => self.repo.apply_patch(*task_id, patch)?,
            ToggleOutcome::Patched {
                task_id,
                patch: TaskPatch::CompletedDates(dates),
            } => self
                .repo
                .set_occurrence_done(*task_id, date, dates.contains(&date))?,
            ToggleOutcome::NoMatch { .. } | ToggleOutcome::NoOccurrence { .. } => {
                warn!(
                    "event=task_toggle module=service status={} task_id={} date={} board={}",
                    toggle_status(&outcome),
                    task_id,
                    format_date_key(date),
                    viewer.board_owner()
                );
                return Ok(outcome);
            }
        }

        info!(
            "event=task_toggle module=service status=ok task_id={} date={} board={}",
            task_id,
            format_date_key(date),
            viewer.board_owner()
        );
        Ok(outcome)
    }

    /// Refetches the viewer's snapshot and builds a board for the window.
    pub fn load_board(
        &self,
        viewer: &Viewer,
        granularity: ViewGranularity,
        pivot: NaiveDate,
    ) -> Result<Board, TaskServiceError> {
        let tasks = self.repo.list_tasks(&viewer.scope())?;
        Ok(Board::new(tasks, granularity, pivot))
    }

    fn managed_task(
        &self,
        viewer: &Viewer,
        task_id: TaskId,
        action: &'static str,
    ) -> Result<Task, TaskServiceError> {
        if !viewer.is_employer() {
            return Err(forbidden(viewer, action));
        }
        let task = self
            .repo
            .get_task(task_id)?
            .ok_or(TaskServiceError::TaskNotFound(task_id))?;
        if !viewer.can_manage(&task) {
            return Err(forbidden(viewer, action));
        }
        Ok(task)
    }
}

fn toggle_status(outcome: &ToggleOutcome) -> &'static str {
    match outcome {
        ToggleOutcome::Patched { .. } => "ok",
        ToggleOutcome::NoMatch { .. } => "no_match",
        ToggleOutcome::NoOccurrence { .. } => "no_occurrence",
    }
}

fn forbidden(viewer: &Viewer, action: &'static str) -> TaskServiceError {
    warn!(
        "event=access_denied module=service status=error user_id={} action=\"{}\"",
        viewer.user_id, action
    );
    TaskServiceError::Forbidden {
        user_id: viewer.user_id.clone(),
        action,
    }
}
