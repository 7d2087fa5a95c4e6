//! reqwest-based OpenAI client.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::OpenAiError;

use super::ModelService;
use super::config::OpenAiConfig;
use super::types::{
    AttachFileRequest, CreateVectorStoreRequest, ExpiresAfter, FileObject, Response,
    ResponseRequest, VectorStore, VectorStoreFile, VectorStoreFileList,
};

/// Page size used when listing vector store files.
const LIST_PAGE_SIZE: u32 = 100;

/// HTTP client for the subset of the OpenAI API used here.
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, OpenAiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(OpenAiError::Request)?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.config.api_key)
    }

    /// Send a request and decode a JSON body, mapping non-2xx to [`OpenAiError::Status`].
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, OpenAiError> {
        let text = self.send(builder).await?;
        serde_json::from_str(&text).map_err(|e| {
            let snippet: String = text.chars().take(200).collect();
            OpenAiError::Decode(format!("{}. Body: {}", e, snippet))
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<String, OpenAiError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(OpenAiError::Request)?;

        let status = response.status();
        let body = response.text().await.map_err(OpenAiError::Request)?;

        if !status.is_success() {
            return Err(OpenAiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl ModelService for OpenAiClient {
    async fn upload_file(
        &self,
        file_name: &str,
        content: String,
        purpose: &str,
    ) -> Result<String, OpenAiError> {
        let part = Part::text(content)
            .file_name(file_name.to_string())
            .mime_str("text/plain")
            .map_err(OpenAiError::Request)?;
        let form = Form::new().text("purpose", purpose.to_string()).part("file", part);

        let file: FileObject = self
            .send_json(self.http.post(self.url("files")).multipart(form))
            .await?;
        debug!("Uploaded file {}", file.id);
        Ok(file.id)
    }

    async fn create_vector_store(
        &self,
        name: &str,
        expires_after_days: u32,
    ) -> Result<String, OpenAiError> {
        let body = CreateVectorStoreRequest {
            name,
            expires_after: ExpiresAfter {
                anchor: "last_active_at",
                days: expires_after_days,
            },
        };

        let store: VectorStore = self
            .send_json(self.http.post(self.url("vector_stores")).json(&body))
            .await?;
        debug!("Created vector store {}", store.id);
        Ok(store.id)
    }

    async fn attach_file(&self, vector_store_id: &str, file_id: &str) -> Result<(), OpenAiError> {
        let path = format!("vector_stores/{}/files", vector_store_id);
        self.send(
            self.http
                .post(self.url(&path))
                .json(&AttachFileRequest { file_id }),
        )
        .await?;
        Ok(())
    }

    async fn list_vector_store_files(
        &self,
        vector_store_id: &str,
    ) -> Result<Vec<VectorStoreFile>, OpenAiError> {
        let path = format!("vector_stores/{}/files", vector_store_id);
        let mut files = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("limit", LIST_PAGE_SIZE.to_string())];
            if let Some(ref cursor) = after {
                query.push(("after", cursor.clone()));
            }

            let page: VectorStoreFileList = self
                .send_json(self.http.get(self.url(&path)).query(&query))
                .await?;
            files.extend(page.data);

            match page.last_id {
                Some(last) if page.has_more => after = Some(last),
                _ => break,
            }
        }

        Ok(files)
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), OpenAiError> {
        let path = format!("files/{}", file_id);
        self.send(self.http.delete(self.url(&path))).await?;
        Ok(())
    }

    async fn delete_vector_store(&self, vector_store_id: &str) -> Result<(), OpenAiError> {
        let path = format!("vector_stores/{}", vector_store_id);
        self.send(self.http.delete(self.url(&path))).await?;
        Ok(())
    }

    async fn create_response(&self, request: &ResponseRequest) -> Result<Response, OpenAiError> {
        debug!(
            "Requesting response from {} with {} tool(s)",
            request.model,
            request.tools.len()
        );
        self.send_json(self.http.post(self.url("responses")).json(request))
            .await
    }
}
