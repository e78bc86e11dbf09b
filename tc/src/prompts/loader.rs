//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Context for the question-phase system prompt
#[derive(Debug, Clone, Serialize)]
pub struct SystemPromptContext {
    pub max_questions: u32,
}

/// Context for the plan-generation prompt
#[derive(Debug, Clone, Serialize)]
pub struct PlanPromptContext {
    /// Labelled transcript of the whole conversation
    pub conversation_summary: String,
    pub original_request: String,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// Override directories, searched in order
    dirs: Vec<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that searches `<project>/.task-cli/prompts` and the
    /// user config directory before the embedded templates
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        let project_root = project_root.as_ref();
        debug!(?project_root, "PromptLoader::new: called");

        let mut candidates = vec![project_root.join(".task-cli").join("prompts")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("task-cli").join("prompts"));
        }

        let dirs = candidates
            .into_iter()
            .filter(|dir| {
                let exists = dir.exists();
                debug!(?dir, %exists, "PromptLoader::new: checking directory");
                exists
            })
            .collect();

        Self {
            hbs: Self::engine(),
            dirs,
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            dirs: Vec::new(),
        }
    }

    /// Create a loader that searches exactly the given directories
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            hbs: Self::engine(),
            dirs,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; HTML escaping would mangle quotes in user answers
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name: override directories first, then embedded
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        for dir in &self.dirs {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: using embedded");
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Render the question-phase system prompt
    pub fn system_prompt(&self, max_questions: u32) -> Result<String> {
        debug!(%max_questions, "PromptLoader::system_prompt: called");
        self.render("system", &SystemPromptContext { max_questions })
    }

    /// Render the plan-generation prompt
    pub fn plan_prompt(&self, conversation_summary: &str, original_request: &str) -> Result<String> {
        debug!(
            summary_len = conversation_summary.len(),
            "PromptLoader::plan_prompt: called"
        );
        self.render(
            "plan",
            &PlanPromptContext {
                conversation_summary: conversation_summary.to_string(),
                original_request: original_request.to_string(),
            },
        )
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::embedded_only()
    }
}
