//! Token estimation for the inline/attachment decision.

use tracing::debug;

use crate::error::CommitgenError;

/// Diffs estimated above this many tokens are uploaded instead of inlined.
pub const INLINE_DIFF_TOKEN_LIMIT: usize = 4096;

/// Count the tokens `text` occupies for `model`.
///
/// A fresh tokenizer is built for every call and dropped before returning,
/// so nothing is cached between calls or shared across invocations.
pub fn estimate_tokens(text: &str, model: &str) -> Result<usize, CommitgenError> {
    let bpe = tiktoken_rs::get_bpe_from_model(model).map_err(|e| CommitgenError::Tokenizer {
        model: model.to_string(),
        reason: e.to_string(),
    })?;

    let count = bpe.encode_with_special_tokens(text).len();
    debug!("Estimated {} tokens for model {}", count, model);
    Ok(count)
}

/// Whether `text` is small enough to embed directly in the prompt.
pub fn fits_inline(text: &str, model: &str) -> Result<bool, CommitgenError> {
    Ok(estimate_tokens(text, model)? <= INLINE_DIFF_TOKEN_LIMIT)
}

/// [`fits_inline`] on the blocking pool.
///
/// Building the tokenizer and encoding up to a megabyte is CPU-bound work
/// that would otherwise stall the async worker it runs on.
pub async fn fits_inline_blocking(text: &str, model: &str) -> Result<bool, CommitgenError> {
    let (text, model) = (text.to_string(), model.to_string());
    let model_name = model.clone();

    tokio::task::spawn_blocking(move || fits_inline(&text, &model))
        .await
        .map_err(|e| CommitgenError::Tokenizer {
            model: model_name,
            reason: e.to_string(),
        })?
}
