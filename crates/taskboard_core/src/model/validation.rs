use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected user input for a required field.
///
/// Display text is user-facing and shown verbatim in notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyUserName,
    EmptyTaskTitle,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUserName => write!(f, "User name cannot be empty"),
            Self::EmptyTaskTitle => write!(f, "Task title cannot be empty"),
        }
    }
}

impl Error for ValidationError {}
