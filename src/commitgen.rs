//! Commit message generation entry point.
//!
//! Reads the staged diff, decides between inlining it and attaching it
//! through a vector store, asks the model for candidates, and validates
//! them. Remote resources created along the way are deleted on every exit
//! path before the result is returned.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::attachment::{
    AttachmentTracker, PollPolicy, check_diff_size, upload_diff, wait_until_indexed,
};
use crate::commit::{CommitMessage, request_candidates, validate_candidates};
use crate::error::CommitgenError;
use crate::git::read_staged_diff;
use crate::openai::{ModelService, OpenAiClient, OpenAiConfig};
use crate::tokens::fits_inline_blocking;

/// Number of candidates requested when the caller does not say otherwise.
pub const DEFAULT_COUNT: usize = 3;

/// Model used when the caller does not say otherwise.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Parameters of one generation.
#[derive(Clone)]
pub struct GenerationRequest {
    /// How many candidates to return. Must be greater than zero.
    pub desired_count: usize,
    /// Directory whose repository's staged changes are described.
    pub working_directory: PathBuf,
    /// Model identifier, also used to pick the tokenizer.
    pub model: String,
    /// API key. Falls back to `OPENAI_API_KEY` when absent.
    pub credential: Option<String>,
    /// Upper bound on waiting for indexing and generation. Creating the
    /// remote attachment is bounded only by the per-request timeout.
    pub deadline: Option<Duration>,
}

impl GenerationRequest {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        Self {
            desired_count: DEFAULT_COUNT,
            working_directory: working_directory.into(),
            model: DEFAULT_MODEL.to_string(),
            credential: None,
            deadline: None,
        }
    }
}

impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("desired_count", &self.desired_count)
            .field("working_directory", &self.working_directory)
            .field("model", &self.model)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("deadline", &self.deadline)
            .finish()
    }
}

/// Generate exactly `request.desired_count` commit message candidates for
/// the staged changes in `request.working_directory`.
///
/// Fails without any remote call when the request is invalid or nothing is
/// staged.
pub async fn generate_commit_messages(
    request: &GenerationRequest,
) -> Result<Vec<CommitMessage>, CommitgenError> {
    validate_request(request)?;

    let diff = read_staged_diff(&request.working_directory).await?;
    debug!("Read staged diff ({} bytes)", diff.len());

    let config = OpenAiConfig::resolve(request.credential.as_deref())?;
    let client = OpenAiClient::new(config).map_err(CommitgenError::Generation)?;

    generate_with_service(&client, &diff, request, PollPolicy::default()).await
}

/// Run the remote half of a generation against `service`.
///
/// Any attachment created is cleaned up exactly once, whether the run
/// succeeds, fails, or hits the deadline.
pub async fn generate_with_service(
    service: &dyn ModelService,
    diff: &str,
    request: &GenerationRequest,
    policy: PollPolicy,
) -> Result<Vec<CommitMessage>, CommitgenError> {
    validate_request(request)?;

    let deadline = request.deadline.map(Deadline::starting_now);
    let mut tracker = AttachmentTracker::new();

    let result = run(service, diff, request, policy, deadline, &mut tracker).await;

    if !tracker.is_empty() {
        debug!("Cleaning up remote attachment");
        tracker.cleanup(service).await;
    }

    result
}

fn validate_request(request: &GenerationRequest) -> Result<(), CommitgenError> {
    if request.desired_count == 0 {
        return Err(CommitgenError::InvalidRequest(
            "desired count must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Point in time after which waiting stops.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    limit: Duration,
}

impl Deadline {
    fn starting_now(limit: Duration) -> Self {
        Self {
            at: Instant::now() + limit,
            limit,
        }
    }
}

/// Await `fut`, abandoning it once `deadline` passes.
///
/// Only for steps that create no remote resources: an abandoned future
/// never reports what it created.
async fn within<T>(
    deadline: Option<Deadline>,
    fut: impl Future<Output = Result<T, CommitgenError>>,
) -> Result<T, CommitgenError> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline.at, fut)
            .await
            .unwrap_or(Err(CommitgenError::DeadlineExceeded {
                secs: deadline.limit.as_secs(),
            })),
        None => fut.await,
    }
}

async fn run(
    service: &dyn ModelService,
    diff: &str,
    request: &GenerationRequest,
    policy: PollPolicy,
    deadline: Option<Deadline>,
    tracker: &mut AttachmentTracker,
) -> Result<Vec<CommitMessage>, CommitgenError> {
    // An oversized diff can never be inlined, so skip tokenizing it.
    check_diff_size(diff)?;

    let attachment = if fits_inline_blocking(diff, &request.model).await? {
        info!("Embedding diff inline");
        None
    } else {
        // Runs to completion so every created id lands in the tracker.
        let attachment = upload_diff(service, diff, tracker).await?;
        within(deadline, wait_until_indexed(service, &attachment, policy)).await?;
        Some(attachment)
    };

    let candidates = within(
        deadline,
        request_candidates(
            service,
            &request.model,
            request.desired_count,
            diff,
            attachment.as_ref(),
        ),
    )
    .await?;

    validate_candidates(request.desired_count, candidates)
}
