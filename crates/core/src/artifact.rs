//! The finished note a successful run returns.
//!
//! Instances are only built by the output validator in `rednote-agent`,
//! so every `FinalArtifact` a caller sees is schema-valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A validated social-media note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalArtifact {
    /// Non-blank headline
    pub title: String,
    /// Non-blank note body
    pub body: String,
    /// Unique, non-blank tags (order irrelevant)
    pub tags: BTreeSet<String>,
    /// Emoji tokens in the order the model chose them
    pub emojis: Vec<String>,
}

impl FinalArtifact {
    /// Render as Markdown ready to paste into a post.
    ///
    /// Emojis are not listed separately; they already live in the title and
    /// body.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("## {}\n\n{}\n\n", self.title.trim(), self.body.trim());

        if !self.tags.is_empty() {
            let tags: Vec<String> = self
                .tags
                .iter()
                .map(|t| {
                    if t.starts_with('#') {
                        t.clone()
                    } else {
                        format!("#{t}")
                    }
                })
                .collect();
            out.push_str(&tags.join(" "));
        }

        out.trim_end().to_string()
    }
}
