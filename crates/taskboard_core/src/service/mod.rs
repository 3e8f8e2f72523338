//! Board use-case services.
//!
//! # Responsibility
//! - Orchestrate task store calls and engine passes into use-case APIs.
//! - Keep callers decoupled from storage details.

pub mod describe;
pub mod task_service;
