//! Domain model for the family task board.
//!
//! # Responsibility
//! - Define the canonical `User` and `Task` records shared by store and storage.
//! - Keep the persisted JSON field naming in one place (serde attributes).
//!
//! # Invariants
//! - Ids are generated once at creation time and never reused.
//! - Records built through constructors are already trimmed and validated.

pub mod id;
pub mod progress;
pub mod task;
pub mod user;
pub mod validation;
pub mod weekday;
