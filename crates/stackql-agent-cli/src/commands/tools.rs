use anyhow::Result;
use console::style;

use crate::configuration::Settings;
use stackql_agent::systems::{StackQlSystem, System};

pub async fn execute(settings: &Settings) -> Result<()> {
    let system = StackQlSystem::new(settings.mcp_client()?);

    println!("{}", style("Tools offered to the model").bold());
    for tool in system.tools() {
        println!("  {} {}", style(&tool.name).green(), style(&tool.description).dim());
    }

    let remote = system.remote_tools().await?;
    println!();
    println!(
        "{}",
        style(format!("Tools advertised by {}", settings.mcp.url)).bold()
    );
    for tool in remote {
        println!("  {} {}", style(&tool.name).cyan(), style(&tool.description).dim());
    }
    Ok(())
}
