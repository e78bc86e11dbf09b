//! Plan domain type
//!
//! A Plan is the deliverable of a conversation: an ordered list of Tasks plus
//! the context (summary, assumptions, notes) the model produced them with.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::task::Task;

/// A complete task plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub title: String,

    /// What was discussed and the approach taken
    pub summary: String,

    /// The user's task description, verbatim
    pub original_request: String,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub assumptions: Vec<String>,

    #[serde(default)]
    pub notes: Option<String>,

    /// As reported by the model. Not kept in sync with task estimates.
    #[serde(default)]
    pub total_estimated_hours: Option<f64>,

    /// Set when the plan is first built; no setter exists
    #[serde(default = "Local::now")]
    created_at: DateTime<Local>,
}

impl Plan {
    /// Create an empty plan stamped with the current local time
    pub fn new(title: impl Into<String>, summary: impl Into<String>, original_request: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            original_request: original_request.into(),
            tasks: Vec::new(),
            assumptions: Vec::new(),
            notes: None,
            total_estimated_hours: None,
            created_at: Local::now(),
        }
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Sum of the task estimates that are present.
    ///
    /// Returns `None` when no task carries an estimate.
    pub fn calculate_total_hours(&self) -> Option<f64> {
        let estimates: Vec<f64> = self.tasks.iter().filter_map(|t| t.estimated_hours).collect();
        if estimates.is_empty() {
            None
        } else {
            Some(estimates.iter().sum())
        }
    }
}
