//! # Rednote Core
//!
//! Domain types, traits, and error definitions for the Rednote content agent.
//! This crate has **no runtime dependencies**: it defines the domain model
//! the provider, tool, and agent crates implement against.
//!
//! ## Layout
//!
//! - [`message`]: the append-only conversation the loop builds
//! - [`provider`]: the model client boundary
//! - [`tool`]: tool trait and the name-keyed dispatch registry
//! - [`agent`]: per-run state machine and failure reports
//! - [`artifact`]: the validated note produced on success

pub mod agent;
pub mod artifact;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentState, AgentStatus, FailureReason, FailureReport};
pub use artifact::FinalArtifact;
pub use error::{ProviderError, ToolError};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
