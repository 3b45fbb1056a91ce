//! PromptCraft CLI - writing prompts from a local Ollama model.

use clap::{Parser, Subcommand};
use commands::until_interrupted;
use promptcraft_ai::PromptCraftConfig;

mod commands;

/// PromptCraft - turn a short description into a creative writing prompt
#[derive(Parser)]
#[command(name = "promptcraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Ollama base URL (overrides PROMPTCRAFT_OLLAMA_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Model to generate with (overrides PROMPTCRAFT_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one writing prompt from a description
    Generate {
        /// Description of the story idea
        #[arg(required = true)]
        description: Vec<String>,
        /// Use the built-in template instead of a model
        #[arg(long)]
        offline: bool,
    },

    /// Interactive session: type descriptions, get prompts back
    Chat,

    /// Show whether the service is running, reachable and has the model
    Status,

    /// Manage models on the Ollama server
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration and executable location
    Info,
}

#[derive(Subcommand)]
enum ModelAction {
    /// List models installed on the server
    List,
    /// Pull a model (default: the configured model)
    Pull {
        /// Model name
        name: Option<String>,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "warn" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let mut config = PromptCraftConfig::from_env();
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| miette::miette!("Failed to start async runtime: {}", e))?;

    match cli.command {
        Commands::Generate {
            description,
            offline,
        } => runtime.block_on(until_interrupted(commands::generate::run(
            config,
            &description.join(" "),
            offline,
        ))),
        Commands::Chat => commands::chat::run(config, &runtime),
        Commands::Status => runtime.block_on(until_interrupted(commands::status::run(config))),
        Commands::Model { action } => match action {
            ModelAction::List => runtime.block_on(until_interrupted(commands::model::list(config))),
            ModelAction::Pull { name } => runtime.block_on(until_interrupted(
                commands::model::pull(config, name.as_deref()),
            )),
        },
        Commands::Info => commands::info::run(&config),
    }
}
