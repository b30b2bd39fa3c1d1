use anyhow::{anyhow, Result};
use console::style;
use tracing::debug;

use crate::configuration::Settings;
use stackql_agent::systems::StackQlSystem;

const START_SERVER_HINT: &str = r#"stackql mcp --mcp.server.type=http --mcp.config '{"server": {"transport": "http", "address": "127.0.0.1:9912"}}'"#;

pub async fn execute(settings: &Settings) -> Result<()> {
    let system = StackQlSystem::new(settings.mcp_client()?);

    match system.greet("StackQL Agent CLI").await {
        Ok(greeting) => {
            debug!(%greeting, "greet succeeded");
            println!(
                "{} Connected to StackQL MCP at {}",
                style("✔").green().bold(),
                settings.mcp.url
            );
            println!("{}", style(greeting).dim());
            Ok(())
        }
        Err(err) => {
            println!(
                "{} StackQL MCP connection failed: {}",
                style("✘").red().bold(),
                err.detail()
            );
            println!("Make sure the StackQL MCP server is running:");
            println!("  {}", style(START_SERVER_HINT).yellow());
            Err(anyhow!("StackQL MCP server at {} is not reachable", settings.mcp.url))
        }
    }
}
