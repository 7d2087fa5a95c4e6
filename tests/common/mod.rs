//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use commitgen::openai::{OpenAiClient, OpenAiConfig};
use git2::{Repository, Signature};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the repository root without staging it.
    pub fn write(&self, name: &str, content: &str) {
        let file_path = self.dir.path().join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    /// Add a file to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write and stage a file in one go.
    pub fn write_staged(&self, name: &str, content: &str) {
        self.write(name, content);
        self.stage(name);
    }

    /// Commit the current index.
    pub fn commit(&self, message: &str) {
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit");
    }
}

/// Build a client that talks to `server` instead of api.openai.com.
pub fn mock_client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(OpenAiConfig {
        api_key: "sk-test".to_string(),
        base_url: server.uri(),
        timeout: Duration::from_secs(10),
    })
    .expect("Failed to build client")
}

/// `count` valid candidates in wire format.
pub fn candidates(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "commitMsgContent": format!("describe change {}", i),
                "conventionalCommitType": "feat"
            })
        })
        .collect()
}

/// A `POST /responses` body carrying one function call per `args` array.
pub fn response_body(calls: &[Value]) -> Value {
    let output: Vec<Value> = calls
        .iter()
        .enumerate()
        .map(|(i, args)| {
            json!({
                "type": "function_call",
                "id": format!("fc_{}", i),
                "call_id": format!("call_{}", i),
                "name": "propose_commit_message",
                "arguments": json!({"args": args}).to_string(),
                "status": "completed"
            })
        })
        .collect();

    json!({
        "id": "resp_1",
        "object": "response",
        "status": "completed",
        "output": output
    })
}

/// Mount a `POST /responses` mock answering with `body`, expected exactly once.
pub async fn mount_response(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// A diff far above the inline token limit but well under the size limit.
pub fn large_diff() -> String {
    let mut diff = String::from(
        "diff --git a/src/values.rs b/src/values.rs\n--- a/src/values.rs\n+++ b/src/values.rs\n@@ -0,0 +1,3000 @@\n",
    );
    for i in 0..3000 {
        diff.push_str(&format!("+let value_{i} = compute({i});\n"));
    }
    diff
}
