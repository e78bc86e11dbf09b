//! Response parsing for model replies
//!
//! Model output is free text that is supposed to carry a JSON object, usually
//! inside a markdown code fence. Decoding is two-phase: [`extract_json`] finds
//! the JSON text and `serde_json` turns it into an untyped [`Value`]; the
//! field helpers in this module then coerce that tree field by field, mapping
//! absence to documented defaults and wrong types to [`DecodeError`].
//!
//! The question phase never surfaces a [`DecodeError`]: [`interpret_turn`]
//! folds it into [`TurnOutcome::Unstructured`]. The plan phase (see
//! [`crate::assembler`]) does.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::domain::ClarifyingQuestion;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Why a reply could not be decoded into the expected shape
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field '{path}'")]
    MissingField { path: String },

    #[error("field '{path}' has the wrong type, expected {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("field '{path}' is invalid: {reason}")]
    InvalidValue { path: String, reason: String },
}

/// Extract the JSON payload from text that may wrap it in a code fence.
///
/// First match wins:
/// 1. content of the first `` ```json `` fence, up to the next `` ``` ``
/// 2. content of the first generic `` ``` `` fence
/// 3. the whole input
///
/// The result is always trimmed. A fence with nothing between its markers
/// does not match.
pub fn extract_json(text: &str) -> &str {
    if let Some(inner) = fenced(text, JSON_FENCE) {
        return inner;
    }
    if let Some(inner) = fenced(text, FENCE) {
        return inner;
    }
    text.trim()
}

fn fenced<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)? + opener.len();
    let end = start + text[start..].find(FENCE)?;
    if end > start { Some(text[start..end].trim()) } else { None }
}

/// Extract and decode the JSON payload of a reply into an untyped tree
pub fn decode_value(text: &str) -> Result<Value, DecodeError> {
    let json = extract_json(text);
    Ok(serde_json::from_str(json)?)
}

/// A decoded question-phase reply
#[derive(Debug, Clone, PartialEq)]
pub enum TurnReply {
    /// The model has enough information
    Ready { summary: String },
    /// The model wants more answers
    Questioning {
        questions: Vec<ClarifyingQuestion>,
        understanding: String,
    },
}

/// What a question-phase round-trip produced
///
/// `Unstructured` is the tolerated failure: the reply did not follow the
/// response contract and is carried verbatim.
#[derive(Debug)]
pub enum TurnOutcome {
    Reply(TurnReply),
    Unstructured { raw: String, error: DecodeError },
}

/// Decode a question-phase reply, failing on any contract violation
pub fn decode_turn(text: &str) -> Result<TurnReply, DecodeError> {
    let value = decode_value(text)?;
    let obj = as_object(&value, "$")?;

    if obj.get("status").and_then(Value::as_str) == Some("ready") {
        let summary = optional_str(obj, "summary", "")?.unwrap_or_default();
        return Ok(TurnReply::Ready { summary });
    }

    let questions = match obj.get("questions") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_question(item, &format!("questions[{i}]")))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(DecodeError::WrongType {
                path: "questions".to_string(),
                expected: "array",
            });
        }
    };
    let understanding = optional_str(obj, "understanding_so_far", "")?.unwrap_or_default();

    Ok(TurnReply::Questioning {
        questions,
        understanding,
    })
}

fn decode_question(value: &Value, path: &str) -> Result<ClarifyingQuestion, DecodeError> {
    let obj = as_object(value, path)?;
    Ok(ClarifyingQuestion {
        question: required_str(obj, "question", path)?,
        context: optional_str(obj, "context", path)?,
        suggestions: string_list(obj, "suggestions", path)?,
    })
}

/// Decode a question-phase reply, folding failures into `Unstructured`
pub fn interpret_turn(text: &str) -> TurnOutcome {
    match decode_turn(text) {
        Ok(reply) => TurnOutcome::Reply(reply),
        Err(error) => {
            debug!(%error, "interpret_turn: reply did not follow the response format");
            TurnOutcome::Unstructured {
                raw: text.to_string(),
                error,
            }
        }
    }
}

// Field coercion helpers shared with the assembler.

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() || parent == "$" {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

pub(crate) fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, DecodeError> {
    value.as_object().ok_or_else(|| DecodeError::WrongType {
        path: path.to_string(),
        expected: "object",
    })
}

/// Present, non-null string. Absence or null is `MissingField`.
pub(crate) fn required_str(obj: &Map<String, Value>, key: &str, parent: &str) -> Result<String, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(DecodeError::MissingField {
            path: join(parent, key),
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DecodeError::WrongType {
            path: join(parent, key),
            expected: "string",
        }),
    }
}

/// String or absent/null
pub(crate) fn optional_str(obj: &Map<String, Value>, key: &str, parent: &str) -> Result<Option<String>, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DecodeError::WrongType {
            path: join(parent, key),
            expected: "string",
        }),
    }
}

/// Array of strings; absent/null is empty
pub(crate) fn string_list(obj: &Map<String, Value>, key: &str, parent: &str) -> Result<Vec<String>, DecodeError> {
    let path = join(parent, key);
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(DecodeError::WrongType {
                    path: format!("{path}[{i}]"),
                    expected: "string",
                }),
            })
            .collect(),
        Some(_) => Err(DecodeError::WrongType {
            path,
            expected: "array of strings",
        }),
    }
}

/// Number or absent/null
pub(crate) fn optional_f64(obj: &Map<String, Value>, key: &str, parent: &str) -> Result<Option<f64>, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(_) => Err(DecodeError::WrongType {
            path: join(parent, key),
            expected: "number",
        }),
    }
}
