//! task-cli - conversational task planner
//!
//! Turns a free-text task description into a structured, actionable plan.
//! A short clarification dialogue with the model comes first; once the model
//! (or the question cap) says it has enough, a final request asks for the
//! plan as JSON, which is validated into a [`Plan`].
//!
//! # Modules
//!
//! - [`domain`] - Plan, Task and conversation records
//! - [`parser`] - JSON extraction and question-phase decoding
//! - [`assembler`] - Plan-phase decoding into validated records
//! - [`session`] - The conversation state machine
//! - [`llm`] - LLM client trait and Anthropic implementation
//! - [`prompts`] - Prompt templates
//! - [`config`] - Configuration types and loading
//! - [`format`] / [`storage`] / [`render`] - Output, persistence and terminal I/O
//! - [`cli`] - Command-line interface

pub mod assembler;
pub mod cli;
pub mod config;
pub mod domain;
pub mod format;
pub mod llm;
pub mod parser;
pub mod prompts;
pub mod render;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use domain::{ClarifyingQuestion, ConversationMessage, Plan, Priority, Role, Task, TaskStatus};
pub use llm::{AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, create_client};
pub use session::{Conversation, ConversationError, SessionConfig};
pub use storage::{PlanStore, StorageError};
