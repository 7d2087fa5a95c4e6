//! Commit message candidates: prompt, generation call, and output contract.

pub mod message;
pub mod prompt;
pub mod request;
pub mod schema;

pub use message::{CommitMessage, CommitType};
pub use prompt::{INSTRUCTIONS, TOOL_NAME, build_input, build_tools};
pub use request::{build_request, collect_candidates, request_candidates};
pub use schema::{commit_messages_schema, validate_candidates};
