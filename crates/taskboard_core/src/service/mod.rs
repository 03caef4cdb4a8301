//! Board use-case services.
//!
//! # Responsibility
//! - Expose the board operations the presentation layer calls.
//! - Keep presentation code away from storage details.

pub mod notice;
pub mod task_board;
