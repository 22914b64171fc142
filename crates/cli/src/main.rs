//! spendlens CLI, the main entry point.
//!
//! Commands:
//! - `tools`: List the research tools and their parameter schemas
//! - `call`: Invoke one tool with JSON arguments
//! - `status`: Show the effective configuration
//! - `config`: Print or validate configuration

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "spendlens",
    about = "spendlens: federal spending research tools",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available tools
    Tools {
        /// Print full definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invoke a tool
    Call {
        /// Tool name, e.g. search_awards
        name: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,

        /// Pin "today" (YYYY-MM-DD) for relative dates
        #[arg(long, env = "SPENDLENS_TODAY")]
        today: Option<NaiveDate>,
    },

    /// Show the effective configuration
    Status,

    /// Print the default configuration, or validate the current one
    Config {
        /// Validate ~/.spendlens/config.toml instead of printing defaults
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries tool payloads
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Tools { json } => commands::tools::run(json)?,
        Commands::Call { name, args, today } => {
            let success = commands::call::run(&name, &args, today).await?;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::Status => commands::status::run()?,
        Commands::Config { validate } => {
            if validate {
                commands::config_cmd::validate()?
            } else {
                commands::config_cmd::show()
            }
        }
    }

    Ok(())
}
