//! OpenAI API boundary: files, vector stores, and the Responses API.

pub mod client;
pub mod config;
pub mod types;

use async_trait::async_trait;

use crate::error::OpenAiError;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
pub use types::{OutputItem, Response, ResponseRequest, Tool, VectorStoreFile};

/// Remote operations the generator depends on.
///
/// [`OpenAiClient`] is the production implementation; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Upload `content` as a file and return its id.
    async fn upload_file(
        &self,
        file_name: &str,
        content: String,
        purpose: &str,
    ) -> Result<String, OpenAiError>;

    /// Create a vector store that expires `expires_after_days` after last use.
    async fn create_vector_store(
        &self,
        name: &str,
        expires_after_days: u32,
    ) -> Result<String, OpenAiError>;

    /// Add an uploaded file to a vector store.
    async fn attach_file(&self, vector_store_id: &str, file_id: &str) -> Result<(), OpenAiError>;

    /// List every file in a vector store with its indexing status.
    async fn list_vector_store_files(
        &self,
        vector_store_id: &str,
    ) -> Result<Vec<VectorStoreFile>, OpenAiError>;

    async fn delete_file(&self, file_id: &str) -> Result<(), OpenAiError>;

    async fn delete_vector_store(&self, vector_store_id: &str) -> Result<(), OpenAiError>;

    /// Issue one generation call.
    async fn create_response(&self, request: &ResponseRequest) -> Result<Response, OpenAiError>;
}
