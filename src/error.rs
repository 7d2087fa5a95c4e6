//! Error types for commitgen modules using thiserror.

use thiserror::Error;

/// Errors from the staged diff query.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git not found. Install git and make sure it is on your PATH")]
    NotInstalled,

    #[error("Failed to spawn git process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git exited with {}: {stderr}",
             code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    NonZeroExit { code: Option<i32>, stderr: String },
}

/// Errors from the OpenAI HTTP boundary.
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("Request to OpenAI failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("OpenAI returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode OpenAI response: {0}")]
    Decode(String),
}

/// Failures while making a large diff retrievable through a vector store.
#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("upload failed: {0}")]
    Upload(#[source] OpenAiError),

    #[error("vector store creation failed: {0}")]
    CreateIndex(#[source] OpenAiError),

    #[error("attaching file to vector store failed: {0}")]
    Attach(#[source] OpenAiError),

    #[error("listing vector store files failed: {0}")]
    Status(#[source] OpenAiError),

    #[error("File indexing failed in vector store")]
    IndexingFailed,

    #[error("File indexing did not complete in time ({attempts} attempts)")]
    IndexingTimeout { attempts: u32 },
}

/// Errors surfaced by [`crate::generate_commit_messages`].
#[derive(Error, Debug)]
pub enum CommitgenError {
    #[error("Could not read staged changes: {0}")]
    Execution(#[source] GitError),

    #[error("No staged changes found. Stage some changes with `git add` first.")]
    EmptyDiff,

    #[error("Staged diff is too large ({size} bytes, limit is {limit} bytes)")]
    DiffTooLarge { size: usize, limit: usize },

    #[error("Failed to create vector store or attach file: {0}")]
    Attachment(#[source] AttachmentError),

    #[error("OpenAI response did not match schema: {}", errors.join("; "))]
    OutputSchema { errors: Vec<String> },

    #[error("No tokenizer available for model '{model}': {reason}")]
    Tokenizer { model: String, reason: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No OpenAI API key. Pass one explicitly or set OPENAI_API_KEY.")]
    MissingCredential,

    #[error("Commit message generation failed: {0}")]
    Generation(#[source] OpenAiError),

    #[error("Commit message generation did not finish within {secs} seconds")]
    DeadlineExceeded { secs: u64 },
}

impl CommitgenError {
    /// Whether the vector store reported that indexing the diff failed.
    pub fn is_indexing_failed(&self) -> bool {
        matches!(
            self,
            CommitgenError::Attachment(AttachmentError::IndexingFailed)
        )
    }

    /// Whether indexing the diff never reached a terminal state.
    pub fn is_indexing_timeout(&self) -> bool {
        matches!(
            self,
            CommitgenError::Attachment(AttachmentError::IndexingTimeout { .. })
        )
    }
}
