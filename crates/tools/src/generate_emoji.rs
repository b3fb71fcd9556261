//! Emoji suggestion tool.
//!
//! Picks a themed emoji set by keyword; otherwise takes a deterministic
//! slice of a general-purpose palette sized by the context's word count.

use async_trait::async_trait;
use rednote_core::error::ToolError;
use rednote_core::tool::{Tool, ToolResult};

use crate::mentions_any;

pub struct GenerateEmojiTool;

const THEMES: &[(&[&str], &[&str])] = &[
    (
        &["hydrat", "moistur", "dewy", "补水", "水润", "保湿"],
        &["💦", "💧", "🌊", "✨"],
    ),
    (
        &["surprise", "wow", "love", "惊喜", "哇塞", "爱了"],
        &["💖", "😍", "🤩", "💯"],
    ),
    (
        &["late night", "tired", "exhausted", "熬夜", "疲惫"],
        &["😭", "😮‍💨", "😴", "💡"],
    ),
    (
        &["recommend", "must-have", "favorite", "好物", "推荐"],
        &["✅", "👍", "⭐", "🛍️"],
    ),
];

const PALETTE: &[&str] = &["✨", "🔥", "💖", "💯", "🎉", "👍", "🤩", "💧", "🌿"];

#[async_trait]
impl Tool for GenerateEmojiTool {
    fn name(&self) -> &str {
        "generate_emoji"
    }

    fn description(&self) -> &str {
        "Suggest a set of emojis that fit the platform's style for the given content or mood."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "context": {
                    "type": "string",
                    "description": "Key content or feeling of the note, e.g. 'surprising results' or 'deep hydration'"
                }
            },
            "required": ["context"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let context = arguments["context"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'context' argument".into()))?;

        let emojis = pick_emojis(context);
        let output = serde_json::to_string(&emojis).map_err(|e| ToolError::ExecutionFailed {
            tool_name: "generate_emoji".into(),
            reason: e.to_string(),
        })?;

        Ok(ToolResult::success(output).with_data(serde_json::json!(emojis)))
    }
}

fn pick_emojis(context: &str) -> Vec<&'static str> {
    if let Some((_, set)) = THEMES
        .iter()
        .find(|(keywords, _)| mentions_any(context, keywords))
    {
        return set.to_vec();
    }

    let count = context.split_whitespace().count().clamp(1, 5);
    // Rotate by length so different contexts get different picks.
    let start = context.chars().count() % PALETTE.len();
    PALETTE
        .iter()
        .cycle()
        .skip(start)
        .take(count)
        .copied()
        .collect()
}
