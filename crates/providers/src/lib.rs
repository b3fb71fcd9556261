//! Model client adapters for Rednote.
//!
//! All providers implement the `rednote_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
