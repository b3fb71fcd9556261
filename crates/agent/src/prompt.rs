//! Prompt construction for the copywriting agent.

use rednote_core::provider::ToolDefinition;

/// Build the system prompt: role, working style, tool catalogue and the
/// final-answer format.
pub fn build_system_prompt(tools: &[ToolDefinition]) -> String {
    let tool_descriptions = if tools.is_empty() {
        "(no tools are available; answer from your own knowledge)".to_string()
    } else {
        tools
            .iter()
            .map(|t| format!("- **{}**: {}", t.name, t.description))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r##"You are a senior copywriter for a lifestyle note-sharing platform. You combine current trends with a product's real selling points to write notes that are engaging, get interaction and convert.

Your task: given a product or topic and a tone, write one complete note with a title, a body, relevant tags and emojis.

## Working Style

Work in Thought, Action, Observation steps. Think about what you still need, call a tool to get it, read the observation, and repeat. Gather enough information before you write. The copy should be lively, sincere and infectious.

## Available Tools

{tool_descriptions}

## Final Answer

When you are done, reply with only the note as a single ```json block in exactly this shape:

```json
{{
  "title": "Note title",
  "body": "Note body",
  "tags": ["#tag1", "#tag2", "#tag3", "#tag4", "#tag5"],
  "emojis": ["✨", "🔥", "💖"]
}}
```

Never send a tool call and the final answer in the same reply."##
    )
}

/// Build the opening user message for one run.
pub fn build_user_prompt(topic: &str, style: &str) -> String {
    format!(
        "Write a note for \"{topic}\". Tone: {style}. Include a title, a body, at least 5 relevant tags and 5 emojis. Output the complete JSON wrapped in a markdown code block (```json ... ```)."
    )
}

/// The observation sent back when a response could not be used.
pub fn corrective_observation(reason: &str) -> String {
    format!(
        "Observation: your last response was rejected: {reason}. Please resubmit either a tool call or the final answer as a single ```json block with \"title\", \"body\", \"tags\" and \"emojis\"."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_lists_tools() {
        let tools = vec![
            ToolDefinition {
                name: "search_web".into(),
                description: "Search the web".into(),
                parameters: serde_json::json!({"type": "object"}),
            },
            ToolDefinition {
                name: "generate_emoji".into(),
                description: "Suggest emojis".into(),
                parameters: serde_json::json!({"type": "object"}),
            },
        ];
        let prompt = build_system_prompt(&tools);
        assert!(prompt.contains("- **search_web**: Search the web"));
        assert!(prompt.contains("- **generate_emoji**: Suggest emojis"));
        assert!(prompt.contains("\"emojis\": [\"✨\""));
    }

    #[test]
    fn system_prompt_without_tools() {
        let prompt = build_system_prompt(&[]);
        assert!(prompt.contains("no tools are available"));
    }

    #[test]
    fn user_prompt_embeds_topic_and_style() {
        let prompt = build_user_prompt("Blue Algae Mask", "playful");
        assert!(prompt.contains("\"Blue Algae Mask\""));
        assert!(prompt.contains("Tone: playful"));
    }

    #[test]
    fn corrective_template_varies_only_in_reason() {
        let a = corrective_observation("reason one");
        let b = corrective_observation("reason two");
        assert_eq!(a.replace("reason one", "X"), b.replace("reason two", "X"));
        assert!(a.starts_with("Observation: your last response was rejected: reason one."));
    }
}
