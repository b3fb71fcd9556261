//! Rednote CLI, the main entry point.
//!
//! Commands:
//! - `generate` Run the agent for one topic and print the note
//! - `render`   Turn a saved JSON answer into Markdown
//! - `tools`    List the tools the agent can call
//! - `config`   Show or initialize the configuration file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rednote",
    about = "Rednote: a ReAct copywriting agent for lifestyle notes",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Use this config file instead of ~/.rednote/config.toml
    #[arg(long, global = true, env = "REDNOTE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a note for a product or topic
    Generate {
        /// Product or topic to write about
        #[arg(short, long)]
        topic: String,

        /// Tone of the copy (defaults to agent.default_style)
        #[arg(short, long)]
        style: Option<String>,

        /// Iteration budget (defaults to agent.max_iterations)
        #[arg(short = 'n', long)]
        max_iterations: Option<u32>,

        /// Override the configured model
        #[arg(short, long)]
        model: Option<String>,

        /// Print the result as JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },

    /// Render a JSON final answer as Markdown
    Render {
        /// File holding the answer, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
    },

    /// List available tools
    Tools {
        /// Include each tool's argument schema
        #[arg(long)]
        schema: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    let config_path = cli
        .config
        .unwrap_or_else(rednote_config::AppConfig::config_path);

    match cli.command {
        Commands::Generate {
            topic,
            style,
            max_iterations,
            model,
            json,
        } => {
            commands::generate::run(commands::generate::GenerateArgs {
                config_path,
                topic,
                style,
                max_iterations,
                model,
                json,
            })
            .await?
        }
        Commands::Render { input } => commands::render::run(&input)?,
        Commands::Tools { schema } => commands::tools::run(schema)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(&config_path)?,
            ConfigAction::Init { force } => commands::config_cmd::init(&config_path, force)?,
            ConfigAction::Path => commands::config_cmd::path(&config_path),
        },
    }

    Ok(())
}

/// Logs go to stderr so stdout carries only the note.
fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
