use anyhow::Result;

use crate::configuration::Settings;
use crate::prompt::rustyline::RustylinePrompt;
use crate::session::Session;

use stackql_agent::agent::Agent;
use stackql_agent::providers::openai::OpenAiProvider;
use stackql_agent::systems::StackQlSystem;

/// An agent wired to OpenAI and the configured StackQL MCP server
pub fn build_agent(settings: &Settings) -> Result<Agent> {
    let provider = OpenAiProvider::new(settings.provider_config()?)?;
    let system = StackQlSystem::new(settings.mcp_client()?);
    Ok(Agent::new(Box::new(provider), Box::new(system))
        .with_max_iterations(settings.agent.max_iterations))
}

pub fn build_session(settings: &Settings) -> Result<Session<'static>> {
    let agent = build_agent(settings)?;
    let prompt = RustylinePrompt::new()?;
    Ok(Session::new(agent, Box::new(prompt), settings.mcp.url.clone()))
}

pub async fn execute(settings: &Settings) -> Result<()> {
    let mut session = build_session(settings)?;
    session.start().await
}
