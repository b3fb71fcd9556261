//! The note-writing agent loop.
//!
//! Drives one bounded Thought → Action → Observation run: call the model,
//! parse its reply, dispatch tool calls or validate the final answer, feed
//! the outcome back as an observation, and repeat until a valid artifact
//! is produced or the iteration budget runs out.

use std::sync::Arc;

use rednote_core::agent::{AgentState, FailureReason, FailureReport};
use rednote_core::artifact::FinalArtifact;
use rednote_core::message::{Conversation, Message, Role};
use rednote_core::provider::{Provider, ProviderRequest, ToolDefinition, Usage};
use rednote_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

use crate::parser::{self, CallSource, ParsedResponse, ToolCallDirective};
use crate::prompt;
use crate::validator;

/// Model-call cycles allowed per run unless the caller says otherwise.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

/// Copywriting agent. Holds only shared, immutable collaborators, so one
/// instance can serve many concurrent runs.
pub struct NoteAgent {
    /// LLM provider.
    provider: Arc<dyn Provider>,
    /// Model name.
    model: String,
    /// Sampling temperature.
    temperature: f32,
    /// Default max tokens per response.
    max_tokens: Option<u32>,
    /// Tool registry.
    tools: Arc<ToolRegistry>,
}

/// A run that produced a valid artifact.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub artifact: FinalArtifact,
    /// Model-call cycles used, including the final one.
    pub iterations: u32,
    /// Tool calls dispatched.
    pub tool_calls_made: usize,
    /// Token usage summed over every model call that reported it.
    pub usage: Usage,
    /// The full transcript.
    pub conversation: Conversation,
}

impl NoteAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
        }
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the loop for one topic.
    ///
    /// Returns the validated artifact, or a [`FailureReport`] if the model
    /// call fails or `max_iterations` cycles pass without a valid answer.
    /// A budget of zero makes no model call.
    pub async fn run(
        &self,
        topic: &str,
        style: &str,
        max_iterations: u32,
    ) -> Result<CompletedRun, FailureReport> {
        let tool_defs = self.tools.definitions();
        let mut conversation = Conversation::new();
        conversation.push(Message::system(prompt::build_system_prompt(&tool_defs)));
        conversation.push(Message::user(prompt::build_user_prompt(topic, style)));

        let mut state = AgentState::new(conversation);
        let mut tool_calls_made = 0usize;
        let mut usage = Usage::default();
        let mut last_rejection: Option<String> = None;

        info!(
            model = %self.model,
            max_iter = max_iterations,
            topic,
            style,
            "Note agent starting"
        );

        while state.is_running() && state.iteration() < max_iterations {
            let iteration = state.begin_iteration();
            debug!(iteration, "Agent iteration");

            // ── Call LLM ──
            let request = self.build_request(state.conversation(), &tool_defs);
            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(iteration, provider = self.provider.name(), error = %e, "Model call failed");
                    state.fail();
                    return Err(FailureReport {
                        reason: FailureReason::AdapterFailure,
                        iterations: state.iteration(),
                        tool_calls_made,
                        detail: e.to_string(),
                    });
                }
            };

            if let Some(u) = response.usage {
                usage.prompt_tokens = usage.prompt_tokens.saturating_add(u.prompt_tokens);
                usage.completion_tokens = usage.completion_tokens.saturating_add(u.completion_tokens);
                usage.total_tokens = usage.total_tokens.saturating_add(u.total_tokens);
            }

            let mut reply = response.message;
            match parser::parse(&reply) {
                // ── Execute tool calls ──
                ParsedResponse::ToolCalls(directive) => {
                    record_recovered_calls(&mut reply, &directive);
                    state.push(reply);
                    for call in &directive.calls {
                        let result = self.tools.dispatch(call).await;
                        tool_calls_made += 1;
                        if result.ok {
                            debug!(iteration, tool = %call.name, "Tool call succeeded");
                        } else {
                            warn!(iteration, tool = %call.name, output = %result.output, "Tool call failed");
                        }
                        state.push(Message::tool_result(&call.id, result.observation()));
                    }
                }

                // ── Validate final answer ──
                ParsedResponse::FinalAnswer(candidate) => {
                    state.push(reply);
                    match validator::validate(&candidate) {
                        Ok(artifact) => {
                            state.succeed();
                            info!(
                                iterations = state.iteration(),
                                tool_calls = tool_calls_made,
                                tokens = usage.total_tokens,
                                "Note agent completed"
                            );
                            return Ok(CompletedRun {
                                artifact,
                                iterations: state.iteration(),
                                tool_calls_made,
                                usage,
                                conversation: state.into_conversation(),
                            });
                        }
                        Err(violations) => {
                            let reason = format!(
                                "the final answer is invalid: {}",
                                validator::describe(&violations)
                            );
                            warn!(iteration, violations = violations.len(), "Final answer rejected");
                            push_correction(&mut state, &reason);
                            last_rejection = Some(reason);
                        }
                    }
                }

                ParsedResponse::Unparseable { reason } => {
                    warn!(iteration, %reason, "Unparseable model response");
                    state.push(reply);
                    push_correction(&mut state, &reason);
                    last_rejection = Some(reason);
                }
            }
        }

        Err(exhausted(&mut state, max_iterations, tool_calls_made, last_rejection))
    }

    fn build_request(
        &self,
        conversation: &Conversation,
        tool_defs: &[ToolDefinition],
    ) -> ProviderRequest {
        ProviderRequest {
            model: self.model.clone(),
            messages: conversation.messages().to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: tool_defs.to_vec(),
        }
    }
}

/// Close a run that used its whole budget.
fn exhausted(
    state: &mut AgentState,
    max_iterations: u32,
    tool_calls_made: usize,
    last_rejection: Option<String>,
) -> FailureReport {
    warn!(max_iter = max_iterations, "Note agent ran out of iterations");
    state.fail();
    let detail = match last_rejection {
        Some(reason) => format!(
            "no valid final answer within {max_iterations} iteration(s); last rejection: {reason}"
        ),
        None => format!("no valid final answer within {max_iterations} iteration(s)"),
    };
    FailureReport {
        reason: FailureReason::IterationBudgetExhausted,
        iterations: state.iteration(),
        tool_calls_made,
        detail,
    }
}

/// Append the corrective observation for a rejected reply.
///
/// Native calls on the rejected reply were never executed, but each id
/// still needs an answering tool message or the transcript is refused by
/// OpenAI-compatible endpoints. Every pending id gets the corrective text.
fn push_correction(state: &mut AgentState, reason: &str) {
    let text = prompt::corrective_observation(reason);
    let pending: Vec<String> = state
        .conversation()
        .last()
        .filter(|m| m.role == Role::Assistant)
        .map(|m| m.tool_calls.iter().map(|c| c.id.clone()).collect())
        .unwrap_or_default();

    if pending.is_empty() {
        state.push(Message::observation(text));
    } else {
        for id in pending {
            state.push(Message::tool_result(id, text.clone()));
        }
    }
}

/// Calls recovered from content are copied onto the assistant message so
/// every tool message answers a recorded call id.
fn record_recovered_calls(reply: &mut Message, directive: &ToolCallDirective) {
    if directive.source != CallSource::Native || directive.calls.len() != reply.tool_calls.len() {
        reply.tool_calls = directive.to_message_calls();
    }
}
