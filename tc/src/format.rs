//! Plan output formats
//!
//! JSON is the machine-readable form and the storage source of truth.
//! Markdown is for people: it is what the terminal shows and what gets
//! written next to the JSON file on save.

use crate::domain::{Plan, Priority};

/// Pretty-printed JSON (2-space indent)
pub fn format_as_json(plan: &Plan) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(plan)
}

/// Markdown document with checkboxes for acceptance criteria
pub fn format_as_markdown(plan: &Plan) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# {}", plan.title));
    lines.push(String::new());

    lines.push(format!("**Created:** {}", plan.created_at().format("%Y-%m-%d %H:%M")));
    if let Some(hours) = plan.total_estimated_hours
        && hours > 0.0
    {
        lines.push(format!("**Estimated Time:** {hours} hours"));
    }
    lines.push(String::new());

    lines.push("## Summary".to_string());
    lines.push(String::new());
    lines.push(plan.summary.clone());
    lines.push(String::new());

    lines.push("## Original Request".to_string());
    lines.push(String::new());
    lines.push(format!("> {}", plan.original_request));
    lines.push(String::new());

    lines.push("## Tasks".to_string());
    lines.push(String::new());

    for (i, task) in plan.tasks.iter().enumerate() {
        lines.push(format!("### {}. {} {}", i + 1, task.title, priority_badge(task.priority)));
        lines.push(String::new());
        lines.push(task.description.clone());
        lines.push(String::new());

        if let Some(hours) = task.estimated_hours
            && hours > 0.0
        {
            lines.push(format!("- **Estimated:** {hours} hours"));
        }
        if !task.dependencies.is_empty() {
            lines.push(format!("- **Dependencies:** {}", task.dependencies.join(", ")));
        }
        if !task.acceptance_criteria.is_empty() {
            lines.push(String::new());
            lines.push("**Acceptance Criteria:**".to_string());
            lines.extend(task.acceptance_criteria.iter().map(|c| format!("- [ ] {c}")));
        }
        lines.push(String::new());
    }

    if !plan.assumptions.is_empty() {
        lines.push("## Assumptions".to_string());
        lines.push(String::new());
        lines.extend(plan.assumptions.iter().map(|a| format!("- {a}")));
        lines.push(String::new());
    }

    if let Some(notes) = plan.notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push("## Notes".to_string());
        lines.push(String::new());
        lines.push(notes.to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "[low]",
        Priority::Medium => "[medium]",
        Priority::High => "**[HIGH]**",
        Priority::Critical => "**[CRITICAL]**",
    }
}
