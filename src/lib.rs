//! commitgen - Conventional Commit message candidates for the staged diff.
//!
//! # Overview
//!
//! commitgen reads `git diff --cached`, sends it to an OpenAI model either
//! inline or through a short-lived vector store when it is too large, and
//! returns candidates validated against a JSON Schema.

pub mod attachment;
pub mod commit;
pub mod commitgen;
pub mod error;
pub mod git;
pub mod openai;
pub mod tokens;

// Re-export commonly used types
pub use attachment::RemoteAttachment;
pub use commit::{CommitMessage, CommitType};
pub use commitgen::{
    DEFAULT_COUNT, DEFAULT_MODEL, GenerationRequest, generate_commit_messages, generate_with_service,
};
pub use error::{AttachmentError, CommitgenError, GitError, OpenAiError};
pub use git::staged_diff;
