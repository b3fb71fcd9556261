//! `rednote generate`: run the agent for one topic.

use std::path::PathBuf;
use std::sync::Arc;

use rednote_agent::NoteAgent;
use rednote_config::AppConfig;
use rednote_providers::OpenAiCompatProvider;

pub struct GenerateArgs {
    pub config_path: PathBuf,
    pub topic: String,
    pub style: Option<String>,
    pub max_iterations: Option<u32>,
    pub model: Option<String>,
    pub json: bool,
}

pub async fn run(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let topic = args.topic.trim();
    if topic.is_empty() {
        return Err("--topic must not be empty".into());
    }

    let mut config =
        AppConfig::load_at(&args.config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(model) = args.model {
        config.provider.model = model;
    }

    // Check for API key early, with a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export DEEPSEEK_API_KEY='sk-...'");
        eprintln!("    export REDNOTE_API_KEY='sk-...'   (any OpenAI-compatible endpoint)");
        eprintln!();
        eprintln!("  Or add `api_key = \"...\"` to your config file:");
        eprintln!("    {}", args.config_path.display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let style = args
        .style
        .unwrap_or_else(|| config.agent.default_style.clone());
    let max_iterations = args.max_iterations.unwrap_or(config.agent.max_iterations);

    let provider = Arc::new(OpenAiCompatProvider::from_config(&config)?);
    let tools = Arc::new(rednote_tools::default_registry());
    let mut agent = NoteAgent::new(
        provider,
        &config.provider.model,
        config.provider.temperature,
        tools,
    );
    if let Some(max) = config.provider.max_tokens {
        agent = agent.with_max_tokens(max);
    }

    match agent.run(topic, &style, max_iterations).await {
        Ok(run) => {
            if args.json {
                let out = serde_json::json!({
                    "status": "succeeded",
                    "artifact": run.artifact,
                    "iterations": run.iterations,
                    "tool_calls_made": run.tool_calls_made,
                    "total_tokens": run.usage.total_tokens,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", run.artifact.to_markdown());
                eprintln!();
                eprintln!(
                    "  {} iteration(s), {} tool call(s), {} tokens",
                    run.iterations, run.tool_calls_made, run.usage.total_tokens
                );
            }
            Ok(())
        }
        Err(report) => {
            if args.json {
                let out = serde_json::json!({
                    "status": "failed",
                    "failure": report,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Err(report.into())
        }
    }
}
