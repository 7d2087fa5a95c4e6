//! Wire types for the OpenAI files, vector store, and responses endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
}

/// Vector store.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorStore {
    pub id: String,
}

/// Membership of a file in a vector store, with its indexing status.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VectorStoreFile {
    pub id: String,
    #[serde(default)]
    pub status: String,
}

/// One page of vector store files.
#[derive(Debug, Deserialize)]
pub(crate) struct VectorStoreFileList {
    pub data: Vec<VectorStoreFile>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub last_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateVectorStoreRequest<'a> {
    pub name: &'a str,
    pub expires_after: ExpiresAfter,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExpiresAfter {
    pub anchor: &'static str,
    pub days: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttachFileRequest<'a> {
    pub file_id: &'a str,
}

/// Tool declaration sent with a generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    FileSearch {
        vector_store_ids: Vec<String>,
    },
    Function {
        name: String,
        description: String,
        parameters: Value,
        strict: bool,
    },
}

/// Body of a `POST /responses` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRequest {
    pub model: String,
    pub instructions: String,
    pub input: String,
    pub tools: Vec<Tool>,
}

/// Result of a `POST /responses` call. Only the output items matter here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

/// A single output item of a response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    FunctionCall {
        #[serde(default)]
        name: String,
        arguments: String,
    },
    #[serde(other)]
    Other,
}
