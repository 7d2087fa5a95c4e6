//! Output contract for commit message candidates.
//!
//! The same JSON Schema constrains the model's tool call and validates what
//! comes back, so a response is never trusted just because it parsed.

use serde_json::{Value, json};
use tracing::debug;

use crate::commit::message::{CommitMessage, CommitType};
use crate::error::CommitgenError;

/// JSON Schema for an array of at least `count` commit messages.
///
/// Objects are closed (`additionalProperties: false`) and the type tag is a
/// closed enumeration of [`CommitType::ALL`].
pub fn commit_messages_schema(count: usize) -> Value {
    let types: Vec<&str> = CommitType::ALL.iter().map(|t| t.as_str()).collect();

    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "commitMsgContent": {
                    "type": "string",
                    "description": "Commit message content, without the Conventional Commit type tag."
                },
                "conventionalCommitType": {
                    "type": "string",
                    "description": "One of the Conventional Commit types.",
                    "enum": types
                }
            },
            "required": ["commitMsgContent", "conventionalCommitType"],
            "additionalProperties": false
        },
        "minItems": count
    })
}

/// Validate aggregated candidates and return exactly `count` of them.
///
/// Fails with [`CommitgenError::OutputSchema`] carrying every validation
/// error, each prefixed with the JSON pointer of the offending value.
/// The model may over-produce; extra candidates are dropped.
pub fn validate_candidates(
    count: usize,
    candidates: Vec<Value>,
) -> Result<Vec<CommitMessage>, CommitgenError> {
    let schema = commit_messages_schema(count);
    let validator = jsonschema::validator_for(&schema).map_err(|e| {
        CommitgenError::OutputSchema {
            errors: vec![format!("invalid schema: {}", e)],
        }
    })?;

    let instance = Value::Array(candidates);
    let errors: Vec<String> = validator
        .iter_errors(&instance)
        .map(|e| {
            let location = e.instance_path().as_str();
            let location = if location.is_empty() { "/" } else { location };
            format!("{}: {}", location, e)
        })
        .collect();

    if !errors.is_empty() {
        debug!("Candidates failed validation with {} error(s)", errors.len());
        return Err(CommitgenError::OutputSchema { errors });
    }

    let mut messages: Vec<CommitMessage> = serde_json::from_value(instance)
        .map_err(|e| CommitgenError::OutputSchema {
            errors: vec![e.to_string()],
        })?;
    messages.truncate(count);
    Ok(messages)
}
