//! Domain types for task-cli
//!
//! Plain records shared by the parser, assembler, session and the output
//! collaborators: Plan, Task, Priority, TaskStatus, ConversationMessage and
//! ClarifyingQuestion.

mod conversation;
mod plan;
mod priority;
mod task;

use thiserror::Error;

pub use conversation::{ClarifyingQuestion, ConversationMessage, Role};
pub use plan::Plan;
pub use priority::Priority;
pub use task::{Task, TaskStatus};

/// Field-level invariant violations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("task title must not be empty")]
    EmptyTitle,

    #[error("estimated hours must be a non-negative number, got {value}")]
    InvalidHours { value: f64 },
}
