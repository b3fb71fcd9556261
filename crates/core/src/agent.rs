//! Per-run agent state and failure reporting.

use crate::message::{Conversation, Message};
use serde::{Deserialize, Serialize};

/// Lifecycle of one run. Moves only out of `Running`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Running,
    Succeeded,
    Failed,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AgentStatus::Running => "running",
            AgentStatus::Succeeded => "succeeded",
            AgentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Runtime state of a single agent invocation.
///
/// Owned exclusively by the loop for the duration of one run. The
/// conversation only grows and the iteration counter only moves forward.
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    conversation: Conversation,
    iteration: u32,
    status: AgentStatus,
}

impl AgentState {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            conversation,
            iteration: 0,
            status: AgentStatus::Running,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == AgentStatus::Running
    }

    /// Append a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.conversation.push(message);
    }

    /// Start the next cycle and return its 1-based number.
    pub fn begin_iteration(&mut self) -> u32 {
        self.iteration += 1;
        self.iteration
    }

    /// Mark the run succeeded. Returns `false` (and changes nothing) if the
    /// run already ended.
    pub fn succeed(&mut self) -> bool {
        self.transition(AgentStatus::Succeeded)
    }

    /// Mark the run failed. Returns `false` (and changes nothing) if the run
    /// already ended.
    pub fn fail(&mut self) -> bool {
        self.transition(AgentStatus::Failed)
    }

    fn transition(&mut self, to: AgentStatus) -> bool {
        if self.status != AgentStatus::Running {
            tracing::warn!(from = %self.status, to = %to, "Ignoring transition out of a terminal state");
            return false;
        }
        self.status = to;
        true
    }

    /// Consume the state, yielding the final conversation.
    pub fn into_conversation(self) -> Conversation {
        self.conversation
    }
}

/// Why a run ended without an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    IterationBudgetExhausted,
    AdapterFailure,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureReason::IterationBudgetExhausted => "iteration budget exhausted",
            FailureReason::AdapterFailure => "adapter failure",
        };
        f.write_str(s)
    }
}

/// The caller-facing failure of a run.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("run failed after {iterations} iteration(s): {reason}: {detail}")]
pub struct FailureReport {
    pub reason: FailureReason,
    /// Model-call cycles consumed before the failure.
    pub iterations: u32,
    /// Tool calls dispatched before the failure.
    pub tool_calls_made: usize,
    /// Human-readable detail (the adapter error, or the last rejection).
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_starts_running_at_zero() {
        let state = AgentState::new(Conversation::new());
        assert_eq!(state.iteration(), 0);
        assert_eq!(state.status(), AgentStatus::Running);
        assert!(state.conversation().is_empty());
    }

    #[test]
    fn iterations_increase_by_one() {
        let mut state = AgentState::default();
        assert_eq!(state.begin_iteration(), 1);
        assert_eq!(state.begin_iteration(), 2);
        assert_eq!(state.iteration(), 2);
    }

    #[test]
    fn terminal_status_cannot_change() {
        let mut state = AgentState::default();
        assert!(state.succeed());
        assert!(!state.is_running());
        assert!(!state.fail());
        assert!(!state.succeed());
        assert_eq!(state.status(), AgentStatus::Succeeded);

        let mut state = AgentState::default();
        assert!(state.fail());
        assert!(!state.succeed());
        assert_eq!(state.status(), AgentStatus::Failed);
    }

    #[test]
    fn failure_reason_serializes_as_tag() {
        let json = serde_json::to_string(&FailureReason::IterationBudgetExhausted).unwrap();
        assert_eq!(json, "\"iteration_budget_exhausted\"");
        let json = serde_json::to_string(&FailureReason::AdapterFailure).unwrap();
        assert_eq!(json, "\"adapter_failure\"");
    }

    #[test]
    fn failure_report_display() {
        let report = FailureReport {
            reason: FailureReason::AdapterFailure,
            iterations: 1,
            tool_calls_made: 0,
            detail: "Network error: connection refused".into(),
        };
        let text = report.to_string();
        assert!(text.contains("adapter failure"));
        assert!(text.contains("1 iteration"));
    }
}
