//! Task domain type
//!
//! A Task is one actionable unit inside a Plan.

use serde::{Deserialize, Serialize};

use super::ValidationError;
use super::priority::Priority;

/// Task completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// A single actionable task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Short, actionable title (starts with a verb)
    pub title: String,

    /// What needs to be done
    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    /// Estimated effort in hours
    #[serde(default)]
    pub estimated_hours: Option<f64>,

    /// Titles of tasks this one depends on. Free text, not checked against the plan.
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub acceptance_criteria: Vec<String>,

    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// Create a pending, medium-priority task with no estimate
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority: Priority::default(),
            estimated_hours: None,
            dependencies: Vec::new(),
            acceptance_criteria: Vec::new(),
            status: TaskStatus::default(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Check field-level invariants: non-empty title, finite non-negative estimate
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if let Some(hours) = self.estimated_hours
            && (!hours.is_finite() || hours < 0.0)
        {
            return Err(ValidationError::InvalidHours { value: hours });
        }
        Ok(())
    }
}
