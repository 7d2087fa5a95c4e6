//! Prompt and tool construction for commit message generation.

use serde_json::json;

use crate::attachment::{DIFF_FILE_NAME, RemoteAttachment};
use crate::commit::schema::commit_messages_schema;
use crate::openai::Tool;

/// Name of the function tool the model calls with its candidates.
pub const TOOL_NAME: &str = "propose_commit_message";

const TOOL_DESCRIPTION: &str = "Propose commit messages for a git diff, separating the conventional commit type and the message content.";

/// Fixed system instructions. Every candidate must describe the whole diff.
pub const INSTRUCTIONS: &str = "You are a commit message generator. Given the given diff.txt, propose commit message candidates as function calls.
Each commit message MUST represent the COMPLETE of diff.txt by itself. It is not acceptable to mention only part of the change.";

/// Build the user input.
///
/// With `inline_diff` the diff text is embedded in a fenced block labelled
/// with the same file name the attachment path uploads under, so the
/// instructions read the same either way.
pub fn build_input(count: usize, inline_diff: Option<&str>) -> String {
    let mut input = format!(
        "Please analyze the {} and generate {} commit message candidates.",
        DIFF_FILE_NAME, count
    );

    if let Some(diff) = inline_diff {
        input.push_str(&format!("\n\n```{}\n{}\n```", DIFF_FILE_NAME, diff));
    }

    input
}

/// Tools offered to the model.
///
/// File search over the attachment comes first when there is one, followed
/// by the strict function tool whose `args` parameter is the candidate array.
pub fn build_tools(count: usize, attachment: Option<&RemoteAttachment>) -> Vec<Tool> {
    let mut tools = Vec::with_capacity(2);

    if let Some(attachment) = attachment {
        tools.push(Tool::FileSearch {
            vector_store_ids: vec![attachment.index_id.clone()],
        });
    }

    tools.push(Tool::Function {
        name: TOOL_NAME.to_string(),
        description: TOOL_DESCRIPTION.to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "args": commit_messages_schema(count)
            },
            "required": ["args"],
            "additionalProperties": false
        }),
        strict: true,
    });

    tools
}
