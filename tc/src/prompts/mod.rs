//! Prompt Template System
//!
//! Template loading chain:
//! 1. `.task-cli/prompts/{name}.pmt` (project override)
//! 2. `~/.config/task-cli/prompts/{name}.pmt` (user override)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{PlanPromptContext, PromptLoader, SystemPromptContext};
