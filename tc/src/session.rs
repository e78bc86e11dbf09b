//! Conversation - the clarification dialogue that precedes a plan
//!
//! A [`Conversation`] owns the message history, the running count of
//! questions asked and the ready flag. Those three fully determine what it
//! does next:
//!
//! - `start` resets everything and sends the task description
//! - `answer` sends a user reply, or does nothing once ready
//! - `generate_plan` asks for the final plan in a fresh request
//!
//! History is append-only. Replies that break the response format during the
//! question phase flip the session to ready instead of failing; a malformed
//! plan is an error.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assembler;
use crate::config::Config;
use crate::domain::{ClarifyingQuestion, ConversationMessage, Plan};
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::parser::{self, DecodeError, TurnOutcome, TurnReply};
use crate::prompts::PromptLoader;

/// Errors surfaced by a conversation
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("conversation is not ready: call start() before generating a plan")]
    NotReady,

    #[error("could not parse plan: {source}")]
    PlanParse {
        #[source]
        source: DecodeError,
    },

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Per-session settings, taken from [`Config`] by default
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Ready is forced once this many questions have been asked
    pub max_questions: u32,
}

impl SessionConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            max_questions: config.conversation.max_questions,
        }
    }

    pub fn with_max_questions(mut self, max_questions: u32) -> Self {
        self.max_questions = max_questions;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A clarification dialogue with the model
pub struct Conversation {
    llm: Arc<dyn LlmClient>,
    config: SessionConfig,
    prompts: PromptLoader,
    messages: Vec<ConversationMessage>,
    questions_asked: u32,
    ready: bool,
    original_request: String,
    understanding: String,
}

impl Conversation {
    pub fn new(llm: Arc<dyn LlmClient>, config: SessionConfig, prompts: PromptLoader) -> Self {
        debug!(?config, "Conversation::new: called");
        Self {
            llm,
            config,
            prompts,
            messages: Vec::new(),
            questions_asked: 0,
            ready: false,
            original_request: String::new(),
            understanding: String::new(),
        }
    }

    /// Begin a new session with the user's task description.
    ///
    /// Any previous session state is discarded.
    pub async fn start(&mut self, task_description: &str) -> Result<Vec<ClarifyingQuestion>, ConversationError> {
        debug!(task_len = task_description.len(), "Conversation::start: called");
        self.messages.clear();
        self.questions_asked = 0;
        self.ready = false;
        self.understanding.clear();
        self.original_request = task_description.to_string();

        self.messages.push(ConversationMessage::user(format!(
            "I need help planning this task: {task_description}"
        )));
        self.round_trip().await
    }

    /// Send the user's reply to the last batch of questions.
    ///
    /// Once ready this returns no questions and touches nothing.
    pub async fn answer(&mut self, response: &str) -> Result<Vec<ClarifyingQuestion>, ConversationError> {
        debug!(ready = self.ready, "Conversation::answer: called");
        if self.ready {
            return Ok(Vec::new());
        }
        self.messages.push(ConversationMessage::user(response));
        self.round_trip().await
    }

    /// Record user input without asking the model anything
    pub fn add_context(&mut self, text: &str) {
        debug!(text_len = text.len(), "Conversation::add_context: called");
        self.messages.push(ConversationMessage::user(text));
    }

    /// Stop asking questions
    pub fn force_ready(&mut self) {
        debug!("Conversation::force_ready: called");
        self.ready = true;
    }

    async fn round_trip(&mut self) -> Result<Vec<ClarifyingQuestion>, ConversationError> {
        let system = self
            .prompts
            .system_prompt(self.config.max_questions)
            .map_err(|e| ConversationError::Prompt(e.to_string()))?;
        let request = CompletionRequest::new(&self.config.model, self.messages.clone(), self.config.max_tokens)
            .with_system(system);

        debug!(messages = self.messages.len(), "round_trip: sending");
        let response = self.llm.complete(request).await?;
        self.messages.push(ConversationMessage::assistant(response.content.clone()));

        Ok(self.apply(parser::interpret_turn(&response.content)))
    }

    fn apply(&mut self, outcome: TurnOutcome) -> Vec<ClarifyingQuestion> {
        match outcome {
            TurnOutcome::Reply(TurnReply::Ready { summary }) => {
                info!("apply: model is ready");
                self.ready = true;
                self.understanding = summary;
                Vec::new()
            }
            TurnOutcome::Reply(TurnReply::Questioning {
                questions,
                understanding,
            }) => {
                self.understanding = understanding;
                self.questions_asked += questions.len() as u32;
                debug!(
                    batch = questions.len(),
                    total = self.questions_asked,
                    max = self.config.max_questions,
                    "apply: received questions"
                );
                if self.questions_asked >= self.config.max_questions {
                    info!(total = self.questions_asked, "apply: question limit reached");
                    self.ready = true;
                }
                questions
            }
            TurnOutcome::Unstructured { raw, error } => {
                warn!(%error, "apply: unstructured reply, treating as ready");
                self.ready = true;
                self.understanding = raw;
                Vec::new()
            }
        }
    }

    /// Ask the model for the final plan.
    ///
    /// Requires at least one round-trip. The request carries the whole
    /// transcript in a single user message and no system prompt; the running
    /// history is left untouched.
    pub async fn generate_plan(&self) -> Result<Plan, ConversationError> {
        debug!(
            ready = self.ready,
            questions_asked = self.questions_asked,
            "Conversation::generate_plan: called"
        );
        if !self.ready && self.questions_asked == 0 {
            return Err(ConversationError::NotReady);
        }

        let prompt = self
            .prompts
            .plan_prompt(&self.build_summary(), &self.original_request)
            .map_err(|e| ConversationError::Prompt(e.to_string()))?;
        let request = CompletionRequest::new(
            &self.config.model,
            vec![ConversationMessage::user(prompt)],
            self.config.max_tokens,
        );

        let response = self.llm.complete(request).await?;
        let plan = assembler::assemble_plan(&response.content, &self.original_request)
            .map_err(|source| ConversationError::PlanParse { source })?;

        info!(title = %plan.title, tasks = plan.tasks.len(), "generate_plan: plan assembled");
        Ok(plan)
    }

    /// Role-labelled transcript followed by the current understanding
    pub fn build_summary(&self) -> String {
        let mut parts: Vec<String> = self
            .messages
            .iter()
            .map(|msg| format!("{}: {}", msg.role.label(), msg.content))
            .collect();
        if !self.understanding.is_empty() {
            parts.push(format!("\nCurrent Understanding: {}", self.understanding));
        }
        parts.join("\n\n")
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn original_request(&self) -> &str {
        &self.original_request
    }

    pub fn understanding(&self) -> &str {
        &self.understanding
    }

    pub fn max_questions(&self) -> u32 {
        self.config.max_questions
    }
}

/// Join a batch of answers into one user message, each as `Q: ...` / `A: ...`
pub fn combine_answers(questions: &[ClarifyingQuestion], answers: &[String]) -> String {
    questions
        .iter()
        .zip(answers)
        .map(|(q, a)| format!("Q: {}\nA: {}", q.question, a))
        .collect::<Vec<_>>()
        .join("\n\n")
}
