//! Occurrence resolution engine.
//!
//! # Responsibility
//! - Expand task snapshots into dated occurrences for a viewing window.
//! - Bucket occurrences into half-hour slots for grid placement.
//! - Answer and flip per-occurrence completion state as persistable patches.
//!
//! # Invariants
//! - Every function here is pure: no I/O, no shared mutable state.
//! - A malformed task degrades by omission; it never fails a whole window.

pub mod board;
pub mod completion;
pub mod occurrence;
pub mod slot;
pub mod window;
