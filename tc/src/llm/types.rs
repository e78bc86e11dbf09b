//! LLM request/response types
//!
//! Shaped after the Anthropic Messages API: ordered history, optional system
//! instruction, model identifier and an output budget in; raw text out.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ConversationMessage;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier (from config)
    pub model: String,

    /// System instruction, omitted from the request when `None`
    pub system_prompt: Option<String>,

    /// Ordered conversation history
    pub messages: Vec<ConversationMessage>,

    /// Max tokens for the reply (from config)
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ConversationMessage>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            messages,
            max_tokens,
        }
    }

    pub fn with_system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// The model's reply
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Raw text of the first text block
    pub content: String,

    pub stop_reason: StopReason,

    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Text-only reply with default metadata
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
}

impl StopReason {
    /// Parse stop reason from Anthropic API response
    pub fn from_anthropic(s: &str) -> Self {
        debug!(%s, "StopReason::from_anthropic: called");
        match s {
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        }
    }
}

/// Token accounting for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
