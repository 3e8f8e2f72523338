//! Core domain logic for the shared task board.
//!
//! The occurrence engine (`engine`) is pure: it turns a fetched task snapshot
//! and a viewing window into dated, slotted occurrences and completion
//! patches. Storage (`db`, `repo`) and role rules (`service`) wrap it.

pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use engine::board::Board;
pub use engine::completion::{is_done, toggle, toggle_in_snapshot, TaskPatch, ToggleOutcome};
pub use engine::occurrence::{occurs_on, resolve, Occurrence};
pub use engine::slot::{
    bucket_of, group_by_day, group_by_day_and_slot, DayGrid, SlotGrid, TimeSlot,
};
pub use engine::window::ViewGranularity;
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::task::{
    parse_wall_clock, RepeatMask, Schedule, Task, TaskDraft, TaskId, TaskUpdate,
    TaskValidationError, UserId,
};
pub use model::viewer::{Role, Viewer, ViewerScope};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::describe::{derive_description_preview, tooltip_text};
pub use service::task_service::{TaskService, TaskServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
