//! Remote attachment of oversized diffs.
//!
//! A diff too large to inline is uploaded as a file, added to a fresh vector
//! store, and polled until indexed so the model can retrieve it with the
//! file search tool. Everything created here is tracked in an
//! [`AttachmentTracker`] owned by a single invocation and deleted afterwards.

pub mod poll;

use tracing::{debug, info, warn};

use crate::error::{AttachmentError, CommitgenError};
use crate::openai::ModelService;

pub use poll::{PollOutcome, PollPolicy, Readiness, poll_until_ready};

/// Hard ceiling on the raw size of a diff that may be uploaded (1 MiB).
pub const REQUEST_DIFF_SIZE_LIMIT: usize = 1_048_576;

/// Name given to the per-invocation vector store.
pub const INDEX_NAME: &str = "commitgen-diff";

/// File name of the uploaded diff. The prompt refers to it by this name.
pub const DIFF_FILE_NAME: &str = "diff.txt";

const UPLOAD_PURPOSE: &str = "user_data";

/// Vector stores expire this many days after their last activity.
const INDEX_EXPIRY_DAYS: u32 = 1;

/// A fully constructed document/index pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAttachment {
    pub document_id: String,
    pub index_id: String,
}

/// Remote resources created so far by one invocation.
///
/// Ids are recorded as soon as each resource exists, so a failure halfway
/// through attaching still leaves everything visible to [`cleanup`].
///
/// [`cleanup`]: AttachmentTracker::cleanup
#[derive(Debug, Default)]
pub struct AttachmentTracker {
    document_id: Option<String>,
    index_id: Option<String>,
}

impl AttachmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no remote resource has been created.
    pub fn is_empty(&self) -> bool {
        self.document_id.is_none() && self.index_id.is_none()
    }

    /// Delete the uploaded document, then the index.
    ///
    /// Each deletion is attempted independently. Failures are logged and
    /// discarded. Ids are taken out of the tracker, so a second call is a no-op.
    pub async fn cleanup(&mut self, service: &dyn ModelService) {
        if let Some(document_id) = self.document_id.take() {
            match service.delete_file(&document_id).await {
                Ok(()) => debug!("Deleted file {}", document_id),
                Err(e) => warn!("Failed to delete file {}: {}", document_id, e),
            }
        }

        if let Some(index_id) = self.index_id.take() {
            match service.delete_vector_store(&index_id).await {
                Ok(()) => debug!("Deleted vector store {}", index_id),
                Err(e) => warn!("Failed to delete vector store {}: {}", index_id, e),
            }
        }
    }
}

/// Reject diffs above [`REQUEST_DIFF_SIZE_LIMIT`] before any upload.
pub fn check_diff_size(diff: &str) -> Result<(), CommitgenError> {
    if diff.len() > REQUEST_DIFF_SIZE_LIMIT {
        return Err(CommitgenError::DiffTooLarge {
            size: diff.len(),
            limit: REQUEST_DIFF_SIZE_LIMIT,
        });
    }
    Ok(())
}

/// Upload `diff`, create a vector store and add the file to it.
///
/// Each id is recorded in `tracker` as soon as the resource exists. This
/// future must be driven to completion: dropping it mid-upload loses the id
/// of a file that may still be created.
pub async fn upload_diff(
    service: &dyn ModelService,
    diff: &str,
    tracker: &mut AttachmentTracker,
) -> Result<RemoteAttachment, CommitgenError> {
    check_diff_size(diff)?;

    info!("Diff too large to inline, uploading {} bytes", diff.len());
    create_resources(service, diff, tracker)
        .await
        .map_err(CommitgenError::Attachment)
}

async fn create_resources(
    service: &dyn ModelService,
    diff: &str,
    tracker: &mut AttachmentTracker,
) -> Result<RemoteAttachment, AttachmentError> {
    let document_id = service
        .upload_file(DIFF_FILE_NAME, diff.to_string(), UPLOAD_PURPOSE)
        .await
        .map_err(AttachmentError::Upload)?;
    tracker.document_id = Some(document_id.clone());

    let index_id = service
        .create_vector_store(INDEX_NAME, INDEX_EXPIRY_DAYS)
        .await
        .map_err(AttachmentError::CreateIndex)?;
    tracker.index_id = Some(index_id.clone());

    service
        .attach_file(&index_id, &document_id)
        .await
        .map_err(AttachmentError::Attach)?;

    Ok(RemoteAttachment {
        document_id,
        index_id,
    })
}

/// Poll the vector store until the uploaded file is indexed.
///
/// Creates nothing, so it is safe to abandon part way.
pub async fn wait_until_indexed(
    service: &dyn ModelService,
    attachment: &RemoteAttachment,
    policy: PollPolicy,
) -> Result<(), CommitgenError> {
    let (index_ref, document_ref) = (attachment.index_id.as_str(), attachment.document_id.as_str());
    let outcome = poll_until_ready(policy, move || async move {
        let files = service
            .list_vector_store_files(index_ref)
            .await
            .map_err(AttachmentError::Status)?;
        let status = files
            .iter()
            .find(|f| f.id == document_ref)
            .map(|f| f.status.as_str())
            .unwrap_or("");
        Ok::<_, AttachmentError>(Readiness::from_file_status(status))
    })
    .await
    .map_err(CommitgenError::Attachment)?;

    match outcome {
        PollOutcome::Ready { attempts } => {
            debug!("File {} indexed after {} check(s)", document_ref, attempts);
            Ok(())
        }
        PollOutcome::Failed { .. } => Err(CommitgenError::Attachment(AttachmentError::IndexingFailed)),
        PollOutcome::Exhausted { attempts } => Err(CommitgenError::Attachment(
            AttachmentError::IndexingTimeout { attempts },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OpenAiError;
    use crate::openai::{MockModelService, VectorStoreFile};
    use mockall::predicate::eq;

    fn status_error() -> OpenAiError {
        OpenAiError::Status {
            status: 500,
            body: "server error".to_string(),
        }
    }

    fn file(id: &str, status: &str) -> VectorStoreFile {
        VectorStoreFile {
            id: id.to_string(),
            status: status.to_string(),
        }
    }

    async fn attach_diff(
        service: &dyn ModelService,
        diff: &str,
        tracker: &mut AttachmentTracker,
        policy: PollPolicy,
    ) -> Result<RemoteAttachment, CommitgenError> {
        let attachment = upload_diff(service, diff, tracker).await?;
        wait_until_indexed(service, &attachment, policy).await?;
        Ok(attachment)
    }

    fn mock_upload_and_store(mock: &mut MockModelService) {
        mock.expect_upload_file()
            .withf(|name, _, purpose| name == DIFF_FILE_NAME && purpose == "user_data")
            .times(1)
            .returning(|_, _, _| Ok("file_1".to_string()));
        mock.expect_create_vector_store()
            .withf(|name, days| name == INDEX_NAME && *days == 1)
            .times(1)
            .returning(|_, _| Ok("vs_1".to_string()));
        mock.expect_attach_file()
            .with(eq("vs_1"), eq("file_1"))
            .times(1)
            .returning(|_, _| Ok(()));
    }

    #[test]
    fn test_check_diff_size_at_limit_is_ok() {
        let diff = "a".repeat(REQUEST_DIFF_SIZE_LIMIT);
        assert!(check_diff_size(&diff).is_ok());
    }

    #[test]
    fn test_check_diff_size_over_limit() {
        let diff = "a".repeat(REQUEST_DIFF_SIZE_LIMIT + 1);
        match check_diff_size(&diff) {
            Err(CommitgenError::DiffTooLarge { size, limit }) => {
                assert_eq!(size, REQUEST_DIFF_SIZE_LIMIT + 1);
                assert_eq!(limit, REQUEST_DIFF_SIZE_LIMIT);
            }
            other => panic!("Expected DiffTooLarge, got: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_diff_success() {
        let mut mock = MockModelService::new();
        mock_upload_and_store(&mut mock);
        mock.expect_list_vector_store_files()
            .with(eq("vs_1"))
            .times(1)
            .returning(|_| Ok(vec![file("other", "in_progress"), file("file_1", "completed")]));

        let mut tracker = AttachmentTracker::new();
        let attachment = attach_diff(&mock, "+diff\n", &mut tracker, PollPolicy::default())
            .await
            .unwrap();

        assert_eq!(
            attachment,
            RemoteAttachment {
                document_id: "file_1".to_string(),
                index_id: "vs_1".to_string(),
            }
        );
        assert_eq!(tracker.document_id.as_deref(), Some("file_1"));
        assert_eq!(tracker.index_id.as_deref(), Some("vs_1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_diff_too_large_makes_no_remote_calls() {
        let mock = MockModelService::new();
        let mut tracker = AttachmentTracker::new();
        let diff = "x".repeat(REQUEST_DIFF_SIZE_LIMIT + 1);

        let result = attach_diff(&mock, &diff, &mut tracker, PollPolicy::default()).await;

        assert!(matches!(result, Err(CommitgenError::DiffTooLarge { .. })));
        assert!(tracker.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_indexing_failed() {
        let mut mock = MockModelService::new();
        mock_upload_and_store(&mut mock);
        mock.expect_list_vector_store_files()
            .times(2)
            .returning({
                let mut calls = 0;
                move |_| {
                    calls += 1;
                    let status = if calls == 1 { "in_progress" } else { "failed" };
                    Ok(vec![file("file_1", status)])
                }
            });

        let mut tracker = AttachmentTracker::new();
        let result = attach_diff(&mock, "+diff\n", &mut tracker, PollPolicy::default()).await;

        let err = result.unwrap_err();
        assert!(err.is_indexing_failed(), "got: {:?}", err);
        assert!(tracker.document_id.is_some() && tracker.index_id.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_indexing_timeout_when_file_never_listed() {
        let mut mock = MockModelService::new();
        mock_upload_and_store(&mut mock);
        mock.expect_list_vector_store_files()
            .times(20)
            .returning(|_| Ok(vec![]));

        let mut tracker = AttachmentTracker::new();
        let result = attach_diff(&mock, "+diff\n", &mut tracker, PollPolicy::default()).await;

        assert!(result.unwrap_err().is_indexing_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_index_creation_failure_still_tracks_document() {
        let mut mock = MockModelService::new();
        mock.expect_upload_file()
            .returning(|_, _, _| Ok("file_1".to_string()));
        mock.expect_create_vector_store()
            .returning(|_, _| Err(status_error()));

        let mut tracker = AttachmentTracker::new();
        let result = attach_diff(&mock, "+diff\n", &mut tracker, PollPolicy::default()).await;

        match result {
            Err(CommitgenError::Attachment(AttachmentError::CreateIndex(_))) => {}
            other => panic!("Expected CreateIndex attachment error, got: {:?}", other),
        }
        assert_eq!(tracker.document_id.as_deref(), Some("file_1"));
        assert!(tracker.index_id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_failure_tracks_nothing() {
        let mut mock = MockModelService::new();
        mock.expect_upload_file()
            .returning(|_, _, _| Err(status_error()));

        let mut tracker = AttachmentTracker::new();
        let result = attach_diff(&mock, "+diff\n", &mut tracker, PollPolicy::default()).await;

        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("Failed to create vector store or attach file"));
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_attempts_both_deletions_when_first_fails() {
        let mut mock = MockModelService::new();
        mock.expect_delete_file()
            .with(eq("file_1"))
            .times(1)
            .returning(|_| Err(status_error()));
        mock.expect_delete_vector_store()
            .with(eq("vs_1"))
            .times(1)
            .returning(|_| Ok(()));

        let mut tracker = AttachmentTracker {
            document_id: Some("file_1".to_string()),
            index_id: Some("vs_1".to_string()),
        };
        tracker.cleanup(&mock).await;
        assert!(tracker.is_empty());

        // Second cleanup is a no-op; mock would panic on extra calls.
        tracker.cleanup(&mock).await;
    }

    #[tokio::test]
    async fn test_cleanup_of_partial_attachment_deletes_document_only() {
        let mut mock = MockModelService::new();
        mock.expect_delete_file().times(1).returning(|_| Ok(()));
        mock.expect_delete_vector_store().times(0);

        let mut tracker = AttachmentTracker {
            document_id: Some("file_1".to_string()),
            index_id: None,
        };
        tracker.cleanup(&mock).await;
        assert!(tracker.is_empty());
    }

    #[tokio::test]
    async fn test_upload_diff_records_both_ids_without_polling() {
        // No list expectation: any status check fails the test.
        let mut mock = MockModelService::new();
        mock_upload_and_store(&mut mock);

        let mut tracker = AttachmentTracker::new();
        let attachment = upload_diff(&mock, "+diff\n", &mut tracker).await.unwrap();

        assert_eq!(attachment.document_id, "file_1");
        assert_eq!(tracker.document_id.as_deref(), Some("file_1"));
        assert_eq!(tracker.index_id.as_deref(), Some("vs_1"));
    }
}
