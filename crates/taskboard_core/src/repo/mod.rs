//! Task store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the listing/mutation contract the board service depends on.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Task::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `PatchKindMismatch`)
//!   in addition to DB transport errors.

pub mod task_repo;
