//! Task board domain model.
//!
//! # Responsibility
//! - Define canonical task records shared by the engine, store and service.
//! - Encode one-time vs weekly semantics as a sum type instead of optional
//!   fields.
//!
//! # Invariants
//! - Every task is identified by a stable, non-nil `TaskId`.
//! - A task is either one-time or weekly; completion state lives inside the
//!   matching `Schedule` variant only.

pub mod task;
pub mod viewer;
