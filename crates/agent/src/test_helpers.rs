//! Shared test helpers for agent tests.

use rednote_core::error::ProviderError;
use rednote_core::message::{Message, MessageToolCall, Role};
use rednote_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted outcomes.
///
/// Each call to `complete` returns the next entry in the script. A provider
/// built with [`repeating`](Self::repeating) returns the same response
/// forever. Otherwise panics if more calls are made than entries provided.
pub struct SequentialMockProvider {
    script: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    repeat: Option<ProviderResponse>,
    strict: bool,
    call_count: Mutex<usize>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    /// Script that may include transport faults.
    pub fn scripted(script: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script),
            repeat: None,
            strict: false,
            call_count: Mutex::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose first call fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::scripted(vec![Err(error)])
    }

    /// A provider that answers every call with `response`.
    pub fn repeating(response: ProviderResponse) -> Self {
        Self {
            repeat: Some(response),
            ..Self::scripted(Vec::new())
        }
    }

    /// Refuse requests the way OpenAI-compatible endpoints do when an
    /// assistant tool call id has no answering tool message.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let unanswered = if self.strict {
            unanswered_call(&request.messages)
        } else {
            None
        };
        self.requests.lock().unwrap().push(request);
        if let Some(id) = unanswered {
            return Err(ProviderError::ApiError {
                status_code: 400,
                message: format!("tool_call_id {id} not answered"),
            });
        }
        let mut count = self.call_count.lock().unwrap();
        let index = *count;
        *count += 1;

        if let Some(response) = &self.repeat {
            return Ok(response.clone());
        }

        let script = self.script.lock().unwrap();
        if index >= script.len() {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                index,
                script.len()
            );
        }
        script[index].clone()
    }
}

/// The first assistant tool call id not answered by the tool messages that
/// directly follow it.
pub fn unanswered_call(messages: &[Message]) -> Option<String> {
    for (i, message) in messages.iter().enumerate() {
        if message.role != Role::Assistant {
            continue;
        }
        let answered: Vec<&str> = messages[i + 1..]
            .iter()
            .take_while(|m| m.role == Role::Tool && m.tool_call_id.is_some())
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();
        if let Some(call) = message
            .tool_calls
            .iter()
            .find(|c| !answered.contains(&c.id.as_str()))
        {
            return Some(call.id.clone());
        }
    }
    None
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response carrying native tool calls.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    let mut message = Message::assistant(thought);
    message.tool_calls = tool_calls;
    ProviderResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 20,
            completion_tokens: 10,
            total_tokens: 30,
        }),
        model: "mock-model".into(),
    }
}

/// Create a native tool call with a unique id.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{}", uuid::Uuid::new_v4().simple()),
        name: name.into(),
        arguments: args.to_string(),
    }
}

/// A final answer wrapped in a ```json block.
pub fn make_final_answer_response(answer: serde_json::Value) -> ProviderResponse {
    make_text_response(&format!(
        "Thought: I have everything I need.\n```json\n{}\n```",
        serde_json::to_string_pretty(&answer).unwrap()
    ))
}

/// A final answer that passes validation.
pub fn valid_answer() -> serde_json::Value {
    serde_json::json!({
        "title": "Desert skin SOS: my 3-night rescue 💦",
        "body": "Late nights left my cheeks tight and flaky. Three evenings with the blue algae mask and the tightness is gone, makeup sits smooth again.",
        "tags": ["#skincare", "#hydration", "#bluealgae", "#masknight", "#glowup"],
        "emojis": ["💦", "💧", "🌊", "✨"]
    })
}
