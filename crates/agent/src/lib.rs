//! The copywriting agent loop for Rednote.
//!
//! A bounded **Thought → Action → Observation** cycle:
//!
//! 1. **Prompt** the model with the role, tool catalogue and answer format
//! 2. **Parse** its reply into tool calls, a final answer, or neither
//! 3. **Act**: dispatch tool calls and append their observations
//! 4. **Validate** a final answer; reject it with a corrective observation
//!    if it breaks the note contract
//!
//! The loop ends with a validated [`FinalArtifact`](rednote_core::FinalArtifact)
//! or a [`FailureReport`](rednote_core::FailureReport) once the model call
//! fails or the iteration budget runs out.

pub mod loop_runner;
pub mod parser;
pub mod prompt;
pub mod validator;

#[cfg(test)]
mod test_helpers;

pub use loop_runner::{CompletedRun, DEFAULT_MAX_ITERATIONS, NoteAgent};
pub use parser::{CallSource, FinalAnswerCandidate, ParsedResponse, ToolCallDirective, parse};
pub use validator::{Violation, validate};
