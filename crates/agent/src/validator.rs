//! Output validator: checks a final-answer candidate against the artifact
//! contract and builds the [`FinalArtifact`].
//!
//! Every violation is collected so one corrective message can list them all.

use std::collections::BTreeSet;

use rednote_core::artifact::FinalArtifact;
use serde_json::{Map, Value};

use crate::parser::FinalAnswerCandidate;

/// Keys that mark a JSON object as a final answer rather than a tool call.
pub const FINAL_ANSWER_FIELDS: &[&str] = &["title", "body", "tags", "hashtags", "emojis"];

/// One way a candidate breaks the artifact contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing { field: &'static str },
    WrongType { field: &'static str, expected: &'static str },
    Blank { field: &'static str },
    NoTags,
    BlankItem { field: &'static str, index: usize },
    NonStringItem { field: &'static str, index: usize },
    EmojiHasWhitespace { index: usize },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Missing { field } => write!(f, "\"{field}\" is missing"),
            Violation::WrongType { field, expected } => {
                write!(f, "\"{field}\" must be {expected}")
            }
            Violation::Blank { field } => write!(f, "\"{field}\" must not be blank"),
            Violation::NoTags => f.write_str("\"tags\" must contain at least one tag"),
            Violation::BlankItem { field, index } => {
                write!(f, "\"{field}\"[{index}] must not be blank")
            }
            Violation::NonStringItem { field, index } => {
                write!(f, "\"{field}\"[{index}] must be a string")
            }
            Violation::EmojiHasWhitespace { index } => {
                write!(f, "\"emojis\"[{index}] must be a single token without whitespace")
            }
        }
    }
}

/// Validate a candidate. On success the artifact satisfies every contract
/// rule; on failure all violations are returned.
pub fn validate(candidate: &FinalAnswerCandidate) -> Result<FinalArtifact, Vec<Violation>> {
    let fields = candidate.fields();
    let mut violations = Vec::new();

    let title = text_field(fields, "title", &mut violations);
    let body = text_field(fields, "body", &mut violations);
    let tags = tags_field(fields, &mut violations);
    let emojis = emojis_field(fields, &mut violations);

    match (title, body, tags, emojis) {
        (Some(title), Some(body), Some(tags), Some(emojis)) if violations.is_empty() => {
            Ok(FinalArtifact {
                title,
                body,
                tags,
                emojis,
            })
        }
        _ => Err(violations),
    }
}

/// Join violations into one human-readable line.
pub fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn text_field(
    fields: &Map<String, Value>,
    field: &'static str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match fields.get(field) {
        None | Some(Value::Null) => {
            violations.push(Violation::Missing { field });
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            violations.push(Violation::Blank { field });
            None
        }
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => {
            violations.push(Violation::WrongType {
                field,
                expected: "a string",
            });
            None
        }
    }
}

fn string_items<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
    key: &str,
    violations: &mut Vec<Violation>,
) -> Option<Vec<(usize, &'a str)>> {
    let items = match fields.get(key) {
        None | Some(Value::Null) => {
            violations.push(Violation::Missing { field });
            return None;
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            violations.push(Violation::WrongType {
                field,
                expected: "an array of strings",
            });
            return None;
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(s) => out.push((index, s)),
            None => violations.push(Violation::NonStringItem { field, index }),
        }
    }
    Some(out)
}

fn tags_field(
    fields: &Map<String, Value>,
    violations: &mut Vec<Violation>,
) -> Option<BTreeSet<String>> {
    // The older prompt format called them hashtags
    let key = if fields.contains_key("tags") {
        "tags"
    } else if fields.contains_key("hashtags") {
        "hashtags"
    } else {
        "tags"
    };

    let items = string_items(fields, "tags", key, violations)?;
    let raw_len = fields
        .get(key)
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    if raw_len == 0 {
        violations.push(Violation::NoTags);
        return None;
    }

    let mut tags = BTreeSet::new();
    for (index, tag) in items {
        let tag = tag.trim();
        if tag.is_empty() {
            violations.push(Violation::BlankItem {
                field: "tags",
                index,
            });
        } else {
            tags.insert(tag.to_string());
        }
    }
    Some(tags)
}

fn emojis_field(fields: &Map<String, Value>, violations: &mut Vec<Violation>) -> Option<Vec<String>> {
    let items = string_items(fields, "emojis", "emojis", violations)?;
    let mut emojis = Vec::with_capacity(items.len());
    for (index, emoji) in items {
        if emoji.is_empty() {
            violations.push(Violation::BlankItem {
                field: "emojis",
                index,
            });
        } else if emoji.chars().any(char::is_whitespace) {
            violations.push(Violation::EmojiHasWhitespace { index });
        } else {
            emojis.push(emoji.to_string());
        }
    }
    Some(emojis)
}

impl From<&FinalArtifact> for FinalAnswerCandidate {
    fn from(artifact: &FinalArtifact) -> Self {
        let mut fields = Map::new();
        fields.insert("title".into(), Value::String(artifact.title.clone()));
        fields.insert("body".into(), Value::String(artifact.body.clone()));
        fields.insert(
            "tags".into(),
            Value::Array(artifact.tags.iter().cloned().map(Value::String).collect()),
        );
        fields.insert(
            "emojis".into(),
            Value::Array(artifact.emojis.iter().cloned().map(Value::String).collect()),
        );
        FinalAnswerCandidate::new(fields)
    }
}
