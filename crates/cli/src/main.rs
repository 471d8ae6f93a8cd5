//! BuddyBot CLI, the main entry point.
//!
//! Commands:
//! - `ask`       Answer a question from the indexed team knowledge
//! - `suggest`   Suggest follow-ups to the last exchange
//! - `history`   Page through the chat history
//! - `ingest`    Run the ingestion job once
//! - `schedule`  Run the ingestion job periodically until Ctrl+C
//! - `status`    Show index size and the last ingestion outcome
//! - `config`    Inspect or initialise the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "buddybot",
    about = "BuddyBot answers questions about your team's code, issues and docs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of ~/.buddybot/config.toml
    #[arg(short, long, global = true, env = "BUDDYBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question
    Ask {
        /// The question to ask
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Suggest follow-up questions to the last answer in the history
    Suggest {
        #[arg(short, long, default_value_t = 3)]
        quantity: usize,
    },

    /// Show chat history, newest page first
    History {
        #[arg(short, long, default_value_t = 10)]
        quantity: usize,

        #[arg(short, long, default_value_t = 0)]
        page: usize,
    },

    /// Run the ingestion job once
    Ingest,

    /// Run the ingestion job now and then periodically
    Schedule {
        /// Override `ingestion.interval_minutes`
        #[arg(short, long)]
        interval_minutes: Option<u64>,
    },

    /// Show index size and the last ingestion outcome
    Status,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration with secrets redacted
    Show,
    /// Print the config file path
    Path,
    /// Validate the configuration
    Validate,
    /// Write a default config file if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config_cmd::show(config_path)?,
            ConfigAction::Path => commands::config_cmd::path(config_path),
            ConfigAction::Validate => commands::config_cmd::validate(config_path)?,
            ConfigAction::Init => commands::config_cmd::init(config_path)?,
        },
        Commands::Ask { question } => {
            let runtime = commands::Runtime::load(config_path)?;
            commands::ask::run(&runtime, &question.join(" ")).await?
        }
        Commands::Suggest { quantity } => {
            commands::suggest::run(&commands::Runtime::load(config_path)?, quantity).await?
        }
        Commands::History { quantity, page } => {
            commands::history::run(&commands::Runtime::load(config_path)?, quantity, page).await?
        }
        Commands::Ingest => commands::ingest::run(&commands::Runtime::load(config_path)?).await?,
        Commands::Schedule { interval_minutes } => {
            let runtime = commands::Runtime::load(config_path)?;
            commands::schedule::run(&runtime, interval_minutes).await?
        }
        Commands::Status => commands::status::run(&commands::Runtime::load(config_path)?).await?,
    }

    Ok(())
}
