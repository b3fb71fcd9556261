//! `rednote render`: turn a saved final answer into Markdown.

use std::io::Read;

use rednote_agent::{ParsedResponse, parse, validate, validator};
use rednote_core::message::Message;

pub fn run(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input).map_err(|e| format!("Failed to read {input}: {e}"))?
    };

    println!("{}", render_text(&text)?);
    Ok(())
}

/// Accepts the bare JSON object or model output with a ```json block.
pub fn render_text(text: &str) -> Result<String, String> {
    match parse(&Message::assistant(text)) {
        ParsedResponse::FinalAnswer(candidate) => validate(&candidate)
            .map(|artifact| artifact.to_markdown())
            .map_err(|violations| format!("Invalid note: {}", validator::describe(&violations))),
        ParsedResponse::ToolCalls(_) => Err("Input is a tool call, not a note".into()),
        ParsedResponse::Unparseable { reason } => Err(format!("Could not read note: {reason}")),
    }
}
