//! Structured output parser.
//!
//! Turns one raw model response into exactly one of: a tool-call directive,
//! a final-answer candidate, or an unparseable verdict with a reason the
//! loop can feed back to the model.
//!
//! Extraction order:
//! 1. Native tool calls attached to the message.
//! 2. A fenced ```json block in the content, or the whole trimmed content
//!    if it is a JSON object. An object naming a `tool`/`action` is a
//!    tool-call envelope; any other object is a final-answer candidate.
//! 3. Textual `Action: name(args)` / `Action Input:` lines, only when the
//!    structured pass found no tool call.
//!
//! A response that carries both a tool call and a final answer is rejected
//! as a whole.

use std::sync::LazyLock;

use regex_lite::Regex;
use rednote_core::message::{Message, MessageToolCall};
use rednote_core::tool::ToolCall;
use serde_json::{Map, Value};

use crate::validator::FINAL_ANSWER_FIELDS;

/// Fenced code block tagged `json`, or untagged.
static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:(?:json|JSON)[ \t]*\r?\n?|[ \t]*\r?\n)(.*?)```").expect("valid regex")
});

/// `Action: name(<json>)` on a single line.
static ACTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*Action:[ \t]*([A-Za-z_][A-Za-z0-9_]*)[ \t]*\((.*)\)[ \t]*$")
        .expect("valid regex")
});

/// `Action: name` followed by `Action Input: <json>`.
static ACTION_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)Action:[ \t]*([A-Za-z_][A-Za-z0-9_]*)[ \t]*\r?\n[ \t]*Action Input:[ \t]*(\{.*\})",
    )
    .expect("valid regex")
});

/// Keys that name the tool in a JSON envelope.
const ENVELOPE_NAME_KEYS: &[&str] = &["tool", "action"];
/// Keys that carry the arguments in a JSON envelope.
const ENVELOPE_ARGS_KEYS: &[&str] = &["arguments", "action_input"];

/// Where a tool call was recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSource {
    /// The provider's native tool-call field.
    Native,
    /// A JSON envelope in the message content.
    Envelope,
    /// `Action:` lines in free text.
    Text,
}

/// One or more tool calls to dispatch, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallDirective {
    pub calls: Vec<ToolCall>,
    pub source: CallSource,
}

impl ToolCallDirective {
    /// The calls in the shape recorded on an assistant message.
    pub fn to_message_calls(&self) -> Vec<MessageToolCall> {
        self.calls
            .iter()
            .map(|c| MessageToolCall {
                id: c.id.clone(),
                name: c.name.clone(),
                arguments: c.arguments.to_string(),
            })
            .collect()
    }
}

/// A JSON object the model offered as its final answer. Not yet validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalAnswerCandidate {
    fields: Map<String, Value>,
}

impl FinalAnswerCandidate {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Outcome of parsing one model response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    ToolCalls(ToolCallDirective),
    FinalAnswer(FinalAnswerCandidate),
    Unparseable { reason: String },
}

impl ParsedResponse {
    fn unparseable(reason: impl Into<String>) -> Self {
        ParsedResponse::Unparseable {
            reason: reason.into(),
        }
    }
}

/// What the JSON pass found in the message content.
enum ContentJson {
    Envelope(ToolCall),
    Final(Map<String, Value>),
}

/// Classify a model response. Never panics.
pub fn parse(message: &Message) -> ParsedResponse {
    let native = match native_calls(&message.tool_calls) {
        Ok(calls) => calls,
        Err(reason) => return ParsedResponse::unparseable(reason),
    };

    let (content_json, remainder) = match content_json(&message.content) {
        Ok(found) => found,
        Err(reason) => return ParsedResponse::unparseable(reason),
    };

    let mut final_answer = None;
    let mut directive = None;
    if !native.is_empty() {
        directive = Some(ToolCallDirective {
            calls: native,
            source: CallSource::Native,
        });
    }

    match content_json {
        Some(ContentJson::Envelope(call)) => match directive.as_mut() {
            Some(d) => d.calls.push(call),
            None => {
                directive = Some(ToolCallDirective {
                    calls: vec![call],
                    source: CallSource::Envelope,
                })
            }
        },
        Some(ContentJson::Final(fields)) => final_answer = Some(fields),
        None => {}
    }

    if directive.is_none() {
        match text_calls(&remainder) {
            Ok(calls) if !calls.is_empty() => {
                directive = Some(ToolCallDirective {
                    calls,
                    source: CallSource::Text,
                })
            }
            Ok(_) => {}
            // A broken `Action:` line next to a valid final answer is noise.
            Err(reason) if final_answer.is_none() => {
                return ParsedResponse::unparseable(reason);
            }
            Err(_) => {}
        }
    }

    match (directive, final_answer) {
        (Some(_), Some(_)) => ParsedResponse::unparseable(
            "the response contained both a tool call and a final answer; send one or the other",
        ),
        (Some(directive), None) => ParsedResponse::ToolCalls(directive),
        (None, Some(fields)) => ParsedResponse::FinalAnswer(FinalAnswerCandidate::new(fields)),
        (None, None) if message.content.trim().is_empty() => {
            ParsedResponse::unparseable("the response was empty")
        }
        (None, None) => {
            ParsedResponse::unparseable("no tool call or JSON final answer was found")
        }
    }
}

fn native_calls(calls: &[MessageToolCall]) -> Result<Vec<ToolCall>, String> {
    calls
        .iter()
        .map(|tc| {
            if tc.name.trim().is_empty() {
                return Err("a tool call had an empty name".to_string());
            }
            let arguments = decode_arguments(&tc.name, &tc.arguments)?;
            Ok(ToolCall {
                id: tc.id.clone(),
                name: tc.name.clone(),
                arguments,
            })
        })
        .collect()
}

/// Decode a raw argument string into a JSON object. Blank means `{}`.
fn decode_arguments(name: &str, raw: &str) -> Result<Value, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ Value::Object(_)) => Ok(v),
        Ok(_) => Err(format!("arguments for tool '{name}' are not a JSON object")),
        Err(e) => Err(format!("arguments for tool '{name}' are malformed JSON: {e}")),
    }
}

/// Find the JSON object in the content, if any, and return it together with
/// the text around it.
fn content_json(content: &str) -> Result<(Option<ContentJson>, String), String> {
    if let Some(caps) = FENCED_JSON.captures(content) {
        let (Some(block), Some(inner)) = (caps.get(0), caps.get(1)) else {
            return Ok((None, content.to_string()));
        };
        let remainder = format!("{}{}", &content[..block.start()], &content[block.end()..]);
        let value: Value = serde_json::from_str(inner.as_str().trim())
            .map_err(|e| format!("the ```json block is malformed JSON: {e}"))?;
        return Ok((Some(classify(value)?), remainder));
    }

    let trimmed = content.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|e| format!("the JSON object is malformed: {e}"))?;
        return Ok((Some(classify(value)?), String::new()));
    }

    Ok((None, content.to_string()))
}

fn classify(value: Value) -> Result<ContentJson, String> {
    let Value::Object(mut fields) = value else {
        return Err("the JSON block is not an object".to_string());
    };

    let name = ENVELOPE_NAME_KEYS
        .iter()
        .find_map(|k| fields.get(*k).and_then(Value::as_str))
        .map(str::to_string);

    let Some(name) = name else {
        return Ok(ContentJson::Final(fields));
    };

    if FINAL_ANSWER_FIELDS.iter().any(|k| fields.contains_key(*k)) {
        return Err(
            "the JSON object mixes a tool call with final-answer fields; send one or the other"
                .to_string(),
        );
    }
    if name.trim().is_empty() {
        return Err("a tool call had an empty name".to_string());
    }

    let raw_args = ENVELOPE_ARGS_KEYS
        .iter()
        .find_map(|k| fields.remove(*k))
        .unwrap_or(Value::Null);
    let arguments = match raw_args {
        Value::Null => Value::Object(Map::new()),
        v @ Value::Object(_) => v,
        // Some models double-encode the arguments
        Value::String(s) => decode_arguments(&name, &s)?,
        _ => return Err(format!("arguments for tool '{name}' are not a JSON object")),
    };

    Ok(ContentJson::Envelope(ToolCall {
        id: synthetic_id(),
        name,
        arguments,
    }))
}

fn text_calls(text: &str) -> Result<Vec<ToolCall>, String> {
    let mut calls = Vec::new();
    for caps in ACTION_CALL.captures_iter(text) {
        let (Some(name), Some(args)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        calls.push(ToolCall {
            id: synthetic_id(),
            name: name.as_str().to_string(),
            arguments: decode_arguments(name.as_str(), args.as_str())?,
        });
    }
    if !calls.is_empty() {
        return Ok(calls);
    }

    if let Some(caps) = ACTION_INPUT.captures(text)
        && let (Some(name), Some(args)) = (caps.get(1), caps.get(2))
    {
        calls.push(ToolCall {
            id: synthetic_id(),
            name: name.as_str().to_string(),
            arguments: decode_arguments(name.as_str(), args.as_str())?,
        });
    }
    Ok(calls)
}

fn synthetic_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn native(name: &str, args: &str) -> Message {
        let mut msg = Message::assistant("");
        msg.tool_calls = vec![MessageToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments: args.into(),
        }];
        msg
    }

    fn expect_calls(parsed: ParsedResponse) -> ToolCallDirective {
        match parsed {
            ParsedResponse::ToolCalls(d) => d,
            other => panic!("expected tool calls, got {other:?}"),
        }
    }

    fn expect_final(parsed: ParsedResponse) -> FinalAnswerCandidate {
        match parsed {
            ParsedResponse::FinalAnswer(c) => c,
            other => panic!("expected final answer, got {other:?}"),
        }
    }

    fn expect_reason(parsed: ParsedResponse) -> String {
        match parsed {
            ParsedResponse::Unparseable { reason } => reason,
            other => panic!("expected unparseable, got {other:?}"),
        }
    }

    #[test]
    fn native_tool_call() {
        let d = expect_calls(parse(&native("search_web", r#"{"query":"mask"}"#)));
        assert_eq!(d.source, CallSource::Native);
        assert_eq!(d.calls.len(), 1);
        assert_eq!(d.calls[0].id, "call_1");
        assert_eq!(d.calls[0].arguments, json!({"query": "mask"}));
    }

    #[test]
    fn native_empty_arguments_are_empty_object() {
        let d = expect_calls(parse(&native("generate_emoji", "  ")));
        assert_eq!(d.calls[0].arguments, json!({}));
    }

    #[test]
    fn native_malformed_arguments() {
        let reason = expect_reason(parse(&native("search_web", "{query:")));
        assert!(reason.contains("malformed JSON"));
    }

    #[test]
    fn native_non_object_arguments() {
        let reason = expect_reason(parse(&native("search_web", "[1, 2]")));
        assert!(reason.contains("not a JSON object"));
    }

    #[test]
    fn fenced_final_answer() {
        let msg = Message::assistant(
            "Thought: I have enough.\n```json\n{\"title\": \"T\", \"body\": \"B\", \"tags\": [\"a\"], \"emojis\": []}\n```",
        );
        let c = expect_final(parse(&msg));
        assert_eq!(c.get("title"), Some(&json!("T")));
    }

    #[test]
    fn bare_json_final_answer() {
        let msg = Message::assistant("  {\"title\": \"T\", \"body\": \"B\"}  ");
        let c = expect_final(parse(&msg));
        assert_eq!(c.fields().len(), 2);
    }

    #[test]
    fn fenced_block_without_language_tag() {
        let msg = Message::assistant("```\n{\"title\": \"T\"}\n```");
        expect_final(parse(&msg));
    }

    #[test]
    fn malformed_fenced_json() {
        let msg = Message::assistant("```json\n{\"title\": \"T\",\n```");
        let reason = expect_reason(parse(&msg));
        assert!(reason.contains("malformed"));
    }

    #[test]
    fn fenced_array_is_not_an_object() {
        let msg = Message::assistant("```json\n[1, 2, 3]\n```");
        let reason = expect_reason(parse(&msg));
        assert!(reason.contains("not an object"));
    }

    #[test]
    fn json_envelope_is_tool_call() {
        let msg = Message::assistant(
            "```json\n{\"tool\": \"query_product_database\", \"arguments\": {\"product_name\": \"mask\"}}\n```",
        );
        let d = expect_calls(parse(&msg));
        assert_eq!(d.source, CallSource::Envelope);
        assert_eq!(d.calls[0].name, "query_product_database");
        assert_eq!(d.calls[0].arguments, json!({"product_name": "mask"}));
        assert!(d.calls[0].id.starts_with("call_"));
    }

    #[test]
    fn action_envelope_with_string_input() {
        let msg = Message::assistant(
            r#"{"action": "search_web", "action_input": "{\"query\": \"trends\"}"}"#,
        );
        let d = expect_calls(parse(&msg));
        assert_eq!(d.calls[0].arguments, json!({"query": "trends"}));
    }

    #[test]
    fn envelope_mixed_with_final_fields() {
        let msg = Message::assistant(r#"{"tool": "search_web", "title": "T"}"#);
        let reason = expect_reason(parse(&msg));
        assert!(reason.contains("mixes"));
    }

    #[test]
    fn textual_action_call() {
        let msg = Message::assistant(
            "Thought: need trends.\nAction: search_web({\"query\": \"beauty trends\"})\n",
        );
        let d = expect_calls(parse(&msg));
        assert_eq!(d.source, CallSource::Text);
        assert_eq!(d.calls[0].name, "search_web");
        assert_eq!(d.calls[0].arguments, json!({"query": "beauty trends"}));
    }

    #[test]
    fn textual_action_without_arguments() {
        let msg = Message::assistant("Action: generate_emoji()");
        let d = expect_calls(parse(&msg));
        assert_eq!(d.calls[0].arguments, json!({}));
    }

    #[test]
    fn textual_action_input_form() {
        let msg = Message::assistant(
            "Thought: look it up\nAction: query_product_database\nAction Input: {\"product_name\": \"serum\"}",
        );
        let d = expect_calls(parse(&msg));
        assert_eq!(d.calls[0].name, "query_product_database");
        assert_eq!(d.calls[0].arguments, json!({"product_name": "serum"}));
    }

    #[test]
    fn textual_calls_get_distinct_ids() {
        let msg = Message::assistant(
            "Action: search_web({\"query\": \"a\"})\nAction: search_web({\"query\": \"b\"})",
        );
        let d = expect_calls(parse(&msg));
        assert_eq!(d.calls.len(), 2);
        assert_ne!(d.calls[0].id, d.calls[1].id);
        let recorded = d.to_message_calls();
        assert_eq!(recorded[1].arguments, r#"{"query":"b"}"#);
    }

    #[test]
    fn textual_action_with_bad_json() {
        let msg = Message::assistant("Action: search_web({query})");
        let reason = expect_reason(parse(&msg));
        assert!(reason.contains("search_web"));
    }

    #[test]
    fn native_call_plus_final_answer_is_rejected() {
        let mut msg = native("search_web", r#"{"query":"x"}"#);
        msg.content = "```json\n{\"title\": \"T\", \"body\": \"B\"}\n```".into();
        let reason = expect_reason(parse(&msg));
        assert!(reason.contains("both"));
    }

    #[test]
    fn textual_call_plus_final_answer_is_rejected() {
        let msg = Message::assistant(
            "Action: search_web({\"query\": \"x\"})\n```json\n{\"title\": \"T\"}\n```",
        );
        let reason = expect_reason(parse(&msg));
        assert!(reason.contains("both"));
    }

    #[test]
    fn native_call_plus_envelope_are_combined() {
        let mut msg = native("search_web", r#"{"query":"x"}"#);
        msg.content = r#"{"tool": "generate_emoji", "arguments": {"context": "glow"}}"#.into();
        let d = expect_calls(parse(&msg));
        assert_eq!(d.source, CallSource::Native);
        assert_eq!(d.calls.len(), 2);
        assert_eq!(d.calls[1].name, "generate_emoji");
    }

    #[test]
    fn plain_prose_is_unparseable() {
        let reason = expect_reason(parse(&Message::assistant("Let me think about this.")));
        assert!(reason.contains("no tool call"));
    }

    #[test]
    fn empty_response_is_unparseable() {
        let reason = expect_reason(parse(&Message::assistant("   ")));
        assert!(reason.contains("empty"));
    }

    #[test]
    fn braces_in_prose_do_not_panic() {
        let msg = Message::assistant("{ this is not json }");
        let reason = expect_reason(parse(&msg));
        assert!(reason.contains("malformed"));
    }
}
