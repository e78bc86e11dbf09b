//! Plan assembly
//!
//! Turns the plan-phase reply into a validated [`Plan`]. Unlike the question
//! phase, every decode failure here is returned to the caller.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{Plan, Priority, Task};
use crate::parser::{self, DecodeError, as_object, optional_f64, optional_str, required_str, string_list};

/// Build a Plan from raw model text.
///
/// `original_request` is used when the reply does not carry one.
pub fn assemble_plan(text: &str, original_request: &str) -> Result<Plan, DecodeError> {
    debug!(text_len = text.len(), "assemble_plan: called");
    let value = parser::decode_value(text)?;
    let obj = as_object(&value, "$")?;

    let mut plan = Plan::new(
        required_str(obj, "title", "")?,
        required_str(obj, "summary", "")?,
        optional_str(obj, "original_request", "")?.unwrap_or_else(|| original_request.to_string()),
    );

    plan.tasks = match obj.get("tasks") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| assemble_task(item, &format!("tasks[{i}]")))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(DecodeError::WrongType {
                path: "tasks".to_string(),
                expected: "array",
            });
        }
    };
    plan.assumptions = string_list(obj, "assumptions", "")?;
    plan.notes = optional_str(obj, "notes", "")?;
    plan.total_estimated_hours = optional_f64(obj, "total_estimated_hours", "")?;

    debug!(tasks = plan.tasks.len(), title = %plan.title, "assemble_plan: assembled");
    Ok(plan)
}

fn assemble_task(value: &Value, path: &str) -> Result<Task, DecodeError> {
    let obj = as_object(value, path)?;

    let mut task = Task::new(required_str(obj, "title", path)?, required_str(obj, "description", path)?);
    task.priority = priority_field(obj, path)?;
    task.estimated_hours = hours_field(obj, path)?;
    task.dependencies = string_list(obj, "dependencies", path)?;
    task.acceptance_criteria = string_list(obj, "acceptance_criteria", path)?;

    task.validate().map_err(|e| DecodeError::InvalidValue {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(task)
}

/// An estimate outside the valid range is dropped rather than failing the plan
fn hours_field(obj: &Map<String, Value>, path: &str) -> Result<Option<f64>, DecodeError> {
    Ok(match optional_f64(obj, "estimated_hours", path)? {
        Some(hours) if !hours.is_finite() || hours < 0.0 => {
            warn!(%path, hours, "hours_field: dropping invalid estimate");
            None
        }
        hours => hours,
    })
}

/// Unknown priority text becomes the default; a non-string is still a type error
fn priority_field(obj: &Map<String, Value>, path: &str) -> Result<Priority, DecodeError> {
    Ok(match optional_str(obj, "priority", path)? {
        Some(raw) => {
            let priority = Priority::lookup(&raw);
            debug!(%raw, %priority, "priority_field: resolved");
            priority
        }
        None => Priority::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;

    #[test]
    fn test_assemble_full_plan() {
        let text = r#"Here is the plan:
```json
{
  "title": "Login Page",
  "summary": "Email/password login with OAuth later",
  "original_request": "Build a login page",
  "tasks": [
    {
      "title": "Create form",
      "description": "Build the login form",
      "priority": "HIGH",
      "estimated_hours": 2.5,
      "dependencies": [],
      "acceptance_criteria": ["Form validates email"]
    },
    {
      "title": "Wire backend",
      "description": "Call the auth endpoint",
      "priority": "critical",
      "dependencies": ["Create form"]
    }
  ],
  "assumptions": ["Backend exists"],
  "notes": "Consider rate limiting",
  "total_estimated_hours": 6
}
```"#;
        let plan = assemble_plan(text, "ignored").unwrap();

        assert_eq!(plan.title, "Login Page");
        assert_eq!(plan.original_request, "Build a login page");
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.tasks[0].priority, Priority::High);
        assert_eq!(plan.tasks[0].estimated_hours, Some(2.5));
        assert_eq!(plan.tasks[0].acceptance_criteria, vec!["Form validates email"]);
        assert_eq!(plan.tasks[0].status, TaskStatus::Pending);
        assert_eq!(plan.tasks[1].priority, Priority::Critical);
        assert_eq!(plan.tasks[1].estimated_hours, None);
        assert_eq!(plan.tasks[1].dependencies, vec!["Create form"]);
        assert_eq!(plan.assumptions, vec!["Backend exists"]);
        assert_eq!(plan.notes.as_deref(), Some("Consider rate limiting"));
        assert_eq!(plan.total_estimated_hours, Some(6.0));
    }

    #[test]
    fn test_priority_normalized() {
        let text = r#"{"title":"Login Page","summary":"...","tasks":[{"title":"Create form","description":"...","priority":"HIGH"}]}"#;
        let plan = assemble_plan(text, "Build a login page").unwrap();
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].priority, Priority::High);
    }

    #[test]
    fn test_unknown_priority_falls_back_to_medium() {
        let text = r#"{"title":"T","summary":"S","tasks":[
            {"title":"A","description":"a","priority":"urgent-ish"},
            {"title":"B","description":"b","priority":"low"}
        ]}"#;
        let plan = assemble_plan(text, "r").unwrap();
        assert_eq!(plan.tasks[0].priority, Priority::Medium);
        assert_eq!(plan.tasks[1].priority, Priority::Low);
    }

    #[test]
    fn test_original_request_defaults_to_session_input() {
        let plan = assemble_plan(r#"{"title":"T","summary":"S"}"#, "Build a login page").unwrap();
        assert_eq!(plan.original_request, "Build a login page");
        assert!(plan.tasks.is_empty());
        assert!(plan.assumptions.is_empty());
        assert!(plan.notes.is_none());
        assert!(plan.total_estimated_hours.is_none());
    }

    #[test]
    fn test_missing_summary_is_error() {
        let err = assemble_plan(r#"{"title":"Login Page","tasks":[]}"#, "r").unwrap_err();
        match err {
            DecodeError::MissingField { path } => assert_eq!(path, "summary"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_task_missing_description_is_error() {
        let err = assemble_plan(r#"{"title":"T","summary":"S","tasks":[{"title":"A"}]}"#, "r").unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { path } if path == "tasks[0].description"));
    }

    #[test]
    fn test_wrong_types_are_errors() {
        assert!(matches!(
            assemble_plan(r#"{"title":"T","summary":"S","tasks":{}}"#, "r"),
            Err(DecodeError::WrongType { .. })
        ));
        assert!(matches!(
            assemble_plan(
                r#"{"title":"T","summary":"S","tasks":[{"title":"A","description":"a","estimated_hours":"two"}]}"#,
                "r"
            ),
            Err(DecodeError::WrongType { .. })
        ));
        assert!(matches!(
            assemble_plan(r#"{"title":"T","summary":"S","assumptions":"none"}"#, "r"),
            Err(DecodeError::WrongType { .. })
        ));
        assert!(matches!(
            assemble_plan(r#"{"title":"T","summary":"S","tasks":[{"title":"A","description":"a","priority":3}]}"#, "r"),
            Err(DecodeError::WrongType { .. })
        ));
    }

    #[test]
    fn test_negative_estimate_is_dropped() {
        let text = r#"{"title":"T","summary":"S","tasks":[
            {"title":"A","description":"a","estimated_hours":-1,"priority":"high"},
            {"title":"B","description":"b","estimated_hours":3}]}"#;
        let plan = assemble_plan(text, "r").unwrap();

        assert_eq!(plan.tasks.len(), 2);
        assert!(plan.tasks[0].estimated_hours.is_none());
        assert_eq!(plan.tasks[0].priority, Priority::High);
        assert_eq!(plan.tasks[1].estimated_hours, Some(3.0));
        assert_eq!(plan.calculate_total_hours(), Some(3.0));
    }

    #[test]
    fn test_blank_task_title_is_error() {
        let blank = r#"{"title":"T","summary":"S","tasks":[{"title":"  ","description":"a"}]}"#;
        assert!(matches!(assemble_plan(blank, "r"), Err(DecodeError::InvalidValue { .. })));
    }

    #[test]
    fn test_nulls_are_absent() {
        let text = r#"{"title":"T","summary":"S","notes":null,"total_estimated_hours":null,
            "tasks":[{"title":"A","description":"a","priority":null,"estimated_hours":null,"dependencies":null}]}"#;
        let plan = assemble_plan(text, "r").unwrap();
        assert!(plan.notes.is_none());
        assert_eq!(plan.tasks[0].priority, Priority::Medium);
        assert!(plan.tasks[0].dependencies.is_empty());
    }

    #[test]
    fn test_not_json_is_error() {
        assert!(matches!(
            assemble_plan("I could not make a plan.", "r"),
            Err(DecodeError::Json(_))
        ));
    }
}
