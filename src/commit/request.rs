//! Generation call and candidate extraction.

use serde_json::Value;
use tracing::{debug, warn};

use crate::attachment::RemoteAttachment;
use crate::commit::prompt::{INSTRUCTIONS, build_input, build_tools};
use crate::error::CommitgenError;
use crate::openai::{ModelService, OutputItem, Response, ResponseRequest};

/// Build the generation request for `diff`.
///
/// With an attachment the diff stays out of the prompt and the model has to
/// retrieve it through file search.
pub fn build_request(
    model: &str,
    count: usize,
    diff: &str,
    attachment: Option<&RemoteAttachment>,
) -> ResponseRequest {
    let inline_diff = if attachment.is_some() { None } else { Some(diff) };

    ResponseRequest {
        model: model.to_string(),
        instructions: INSTRUCTIONS.to_string(),
        input: build_input(count, inline_diff),
        tools: build_tools(count, attachment),
    }
}

/// Issue one generation call and return the unvalidated candidates.
pub async fn request_candidates(
    service: &dyn ModelService,
    model: &str,
    count: usize,
    diff: &str,
    attachment: Option<&RemoteAttachment>,
) -> Result<Vec<Value>, CommitgenError> {
    let request = build_request(model, count, diff, attachment);
    let response = service
        .create_response(&request)
        .await
        .map_err(CommitgenError::Generation)?;

    let candidates = collect_candidates(&response);
    debug!("Model proposed {} candidate(s)", candidates.len());
    Ok(candidates)
}

/// Flatten the `args` arrays of every function call in `response`.
///
/// A call whose arguments do not parse, or that has no `args` array,
/// contributes nothing.
pub fn collect_candidates(response: &Response) -> Vec<Value> {
    response
        .output
        .iter()
        .filter_map(|item| match item {
            OutputItem::FunctionCall { name, arguments } => Some((name, arguments)),
            OutputItem::Other => None,
        })
        .flat_map(|(name, arguments)| call_candidates(name, arguments))
        .collect()
}

fn call_candidates(name: &str, arguments: &str) -> Vec<Value> {
    let payload: Value = match serde_json::from_str(arguments) {
        Ok(v) => v,
        Err(e) => {
            warn!("Ignoring function call '{}' with malformed arguments: {}", name, e);
            return Vec::new();
        }
    };

    match payload {
        Value::Object(mut map) => match map.remove("args") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                warn!(
                    "Ignoring function call '{}': args is not an array ({})",
                    name, other
                );
                Vec::new()
            }
            None => {
                warn!("Ignoring function call '{}' without args", name);
                Vec::new()
            }
        },
        _ => {
            warn!("Ignoring function call '{}': arguments are not an object", name);
            Vec::new()
        }
    }
}
