//! LLM client module for task-cli
//!
//! Provides the client abstraction the conversation runs against and the
//! Anthropic implementation used by the binary.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::{ErrorKind, LlmError};
pub use types::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};

use crate::config::LlmConfig;

/// Create the LLM client described by config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(model = %config.model, "create_client: called");
    Ok(Arc::new(AnthropicClient::from_config(config)?))
}
