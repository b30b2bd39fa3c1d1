use anyhow::Result;

use crate::configuration::Settings;

pub async fn execute(settings: &Settings, text: &str) -> Result<()> {
    // Run is a session that answers one message and stops
    let mut session = super::session::build_session(settings)?;
    session.headless_start(text).await
}
