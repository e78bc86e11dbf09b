//! Terminal output and interactive input
//!
//! Everything the binary prints to the user goes through here, so the
//! library modules never touch stdout. Input is read with rustyline; Ctrl+C
//! surfaces as [`Interrupted`].

use colored::Colorize;
use eyre::{Result, eyre};
use rustyline::DefaultEditor;
use termimad::MadSkin;
use termimad::crossterm::style::Color;
use rustyline::error::ReadlineError;
use thiserror::Error;
use tracing::debug;

use crate::domain::ClarifyingQuestion;
use crate::llm::{ErrorKind, LlmError};
use crate::storage::PlanSummary;

/// The user pressed Ctrl+C
#[derive(Debug, Error)]
#[error("cancelled by user")]
pub struct Interrupted;

/// Line editor for answers and confirmations
pub struct Prompter {
    editor: DefaultEditor,
}

impl Prompter {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| eyre!("Failed to initialize readline: {}", e))?;
        Ok(Self { editor })
    }

    /// Read one line. Ctrl+D reads as an empty line.
    pub fn read_line(&mut self, prompt: &str) -> Result<String> {
        match self.editor.readline(&format!("{} ", prompt.bold())) {
            Ok(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    let _ = self.editor.add_history_entry(&line);
                }
                Ok(line)
            }
            Err(ReadlineError::Interrupted) => {
                debug!("Prompter::read_line: interrupted");
                Err(Interrupted.into())
            }
            Err(ReadlineError::Eof) => Ok(String::new()),
            Err(err) => Err(eyre!("Readline error: {}", err)),
        }
    }

    /// Ask a yes/no question
    pub fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let line = self.read_line(&format!("{prompt} {hint}"))?;
        Ok(parse_confirm(&line, default))
    }
}

/// Interpret a yes/no reply; anything unrecognized is the default
pub fn parse_confirm(input: &str, default: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

/// Body lines of a question panel, uncolored
pub fn question_lines(index: usize, total: usize, question: &ClarifyingQuestion) -> Vec<String> {
    let mut lines = vec![format!("Question {index}/{total}: {}", question.question)];
    if let Some(context) = question.context.as_deref().filter(|c| !c.is_empty()) {
        lines.push(format!("({context})"));
    }
    if !question.suggestions.is_empty() {
        lines.push(format!("Suggestions: {}", question.suggestions.join(" | ")));
    }
    lines
}

pub fn print_question(index: usize, total: usize, question: &ClarifyingQuestion) {
    let lines = question_lines(index, total, question);
    println!();
    println!("{}", "─".repeat(60).cyan());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("{}", line.bold());
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!("{}", "─".repeat(60).cyan());
}

pub fn print_welcome() {
    println!("{}", "Task CLI".bold().blue());
    println!("Describe your task and I'll help you break it down into");
    println!("actionable steps through a short conversation.");
    println!();
}

pub fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

pub fn print_success(message: &str) {
    println!("{}", message.green());
}

pub fn print_warning(message: &str) {
    println!("{}", message.yellow());
}

pub fn print_error(title: &str, detail: &str) {
    eprintln!("{} {}", format!("{title}:").red().bold(), detail);
}

/// Title and advice for a provider failure
pub fn llm_diagnostic(err: &LlmError) -> (&'static str, String) {
    match (err.kind(), err) {
        (_, LlmError::MissingApiKey(_)) => ("Configuration Error", err.to_string()),
        (ErrorKind::Authentication, _) => (
            "Authentication Error",
            "Your API key is invalid or has been revoked.\n\
             Check your key at https://console.anthropic.com/settings/keys"
                .to_string(),
        ),
        (ErrorKind::RateLimited, _) => {
            let wait = err
                .retry_after()
                .map(|d| format!(" Retry in {}s.", d.as_secs()))
                .unwrap_or_default();
            ("Rate Limited", format!("You've made too many requests.{wait}"))
        }
        (ErrorKind::Billing, _) => (
            "Billing Error",
            "Your Anthropic account needs credits to use the API.\n\
             Visit https://console.anthropic.com/settings/billing"
                .to_string(),
        ),
        (ErrorKind::BadRequest, _) => ("Invalid Request", err.to_string()),
        (ErrorKind::Connection, _) => (
            "Connection Error",
            "Could not connect to the Anthropic API. Check your internet connection and try again.".to_string(),
        ),
        (ErrorKind::Server, _) => (
            "API Error",
            format!("{err}\nThis is an issue with the Anthropic API. Try again later."),
        ),
        (ErrorKind::Other, _) => ("Unexpected Error", err.to_string()),
    }
}

pub fn print_llm_error(err: &LlmError) {
    let (title, body) = llm_diagnostic(err);
    eprintln!("{}", title.red().bold());
    eprintln!("{body}");
}

/// Terminal renderer for plan markdown.
///
/// Rich mode styles the document with termimad; plain mode passes it through
/// untouched for `--no-color` and non-terminal output.
pub struct MarkdownRenderer {
    rich: bool,
    skin: MadSkin,
}

impl MarkdownRenderer {
    pub fn new(rich: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Cyan);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Grey);
        skin.inline_code.set_bg(Color::AnsiValue(238));
        Self { rich, skin }
    }

    pub fn render(&self, markdown: &str) -> String {
        if self.rich {
            self.skin.term_text(markdown).to_string()
        } else {
            markdown.to_string()
        }
    }
}

/// Saved plans as an aligned table
pub fn plans_table(plans: &[PlanSummary]) -> String {
    let title_width = plans.iter().map(|p| p.title.chars().count()).max().unwrap_or(0).max(5);
    let mut out = format!("{:<10}  {:<title_width$}  {}\n", "Date", "Title", "Filename");
    for plan in plans {
        let date = if plan.filename.len() > 10 {
            plan.filename.get(..10).unwrap_or("Unknown")
        } else {
            "Unknown"
        };
        out.push_str(&format!("{:<10}  {:<title_width$}  {}\n", date, plan.title, plan.filename));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_confirm() {
        assert!(parse_confirm("y", false));
        assert!(parse_confirm(" YES ", false));
        assert!(!parse_confirm("n", true));
        assert!(parse_confirm("", true));
        assert!(!parse_confirm("maybe", false));
    }

    #[test]
    fn test_question_lines() {
        let q = ClarifyingQuestion {
            question: "Which auth provider?".to_string(),
            context: Some("Affects the login flow".to_string()),
            suggestions: vec!["OAuth".to_string(), "email/password".to_string()],
        };
        assert_eq!(
            question_lines(1, 2, &q),
            vec![
                "Question 1/2: Which auth provider?",
                "(Affects the login flow)",
                "Suggestions: OAuth | email/password",
            ]
        );

        let bare = ClarifyingQuestion {
            question: "Deadline?".to_string(),
            context: None,
            suggestions: vec![],
        };
        assert_eq!(question_lines(2, 2, &bare).len(), 1);
    }

    #[test]
    fn test_rich_render_styles_bold_labels() {
        let out = MarkdownRenderer::new(true).render("**Created:** 2026-10-19 10:00\n- **Dependencies:** A, B");
        assert!(!out.contains("**"));
        assert!(out.contains("Created:"));
        assert!(out.contains("Dependencies:"));
        assert!(out.contains("2026-10-19 10:00"));
    }

    #[test]
    fn test_plain_render_passes_through() {
        let renderer = MarkdownRenderer::new(false);
        let md = "# Login Page\n\n### 1. Create form **[HIGH]**";
        assert_eq!(renderer.render(md), md);
    }

    #[test]
    fn test_plans_table() {
        let plans = vec![PlanSummary {
            filename: "2026-01-07_my-plan".to_string(),
            title: "My Plan".to_string(),
            created: "2026-01-07T10:00:00+00:00".to_string(),
            path: PathBuf::from("/tmp/2026-01-07_my-plan.json"),
        }];
        let table = plans_table(&plans);
        assert!(table.starts_with("Date"));
        assert!(table.contains("2026-01-07  My Plan  2026-01-07_my-plan"));
    }

    #[test]
    fn test_llm_diagnostic() {
        let auth = LlmError::ApiError {
            status: 401,
            message: "invalid x-api-key".to_string(),
        };
        assert_eq!(llm_diagnostic(&auth).0, "Authentication Error");

        let billing = LlmError::ApiError {
            status: 400,
            message: "Your credit balance is too low".to_string(),
        };
        assert_eq!(llm_diagnostic(&billing).0, "Billing Error");

        let missing = LlmError::MissingApiKey("TASK_CLI_ANTHROPIC_API_KEY".to_string());
        let (title, body) = llm_diagnostic(&missing);
        assert_eq!(title, "Configuration Error");
        assert!(body.contains("TASK_CLI_ANTHROPIC_API_KEY"));

        let limited = LlmError::RateLimited {
            retry_after: std::time::Duration::from_secs(30),
        };
        assert!(llm_diagnostic(&limited).1.contains("Retry in 30s"));
    }
}
