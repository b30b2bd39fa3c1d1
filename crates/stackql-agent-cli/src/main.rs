use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod configuration;
mod error;
mod prompt;
mod session;

use configuration::{Overrides, Settings};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Ask questions about your cloud infrastructure through StackQL",
    long_about = None
)]
struct Cli {
    /// OpenAI API key (can also be set via OPENAI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model to use (can also be set via OPENAI_MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Base URL of the StackQL MCP server (can also be set via STACKQL_MCP_URL)
    #[arg(long, global = true)]
    mcp_url: Option<String>,

    /// Model round-trips allowed for a single question
    #[arg(long, global = true)]
    max_iterations: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session
    Session,

    /// Ask a single question and print the answer
    Run {
        /// The question to ask
        #[arg(short, long)]
        text: String,
    },

    /// List the tools of the StackQL MCP server
    Tools,

    /// Check that the StackQL MCP server answers
    Ping,

    /// Print the version
    Version,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            mcp_url: self.mcp_url.clone(),
            max_iterations: self.max_iterations,
        }
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env file is fine
    dotenv::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();

    if let Some(Command::Version) = cli.command {
        return commands::version::execute().await;
    }

    let settings =
        Settings::load(&cli.overrides()).context("Failed to load configuration")?;

    match cli.command {
        None | Some(Command::Session) => commands::session::execute(&settings).await,
        Some(Command::Run { text }) => commands::run::execute(&settings, &text).await,
        Some(Command::Tools) => commands::tools::execute(&settings).await,
        Some(Command::Ping) => commands::ping::execute(&settings).await,
        Some(Command::Version) => commands::version::execute().await,
    }
}
