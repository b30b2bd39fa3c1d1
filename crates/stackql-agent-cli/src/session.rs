use anyhow::Result;
use tracing::info;

use crate::prompt::{InputType, Prompt};

use stackql_agent::agent::{Agent, DEFAULT_SYSTEM_PROMPT};
use stackql_agent::models::message::Turn;

#[cfg(test)]
mod mock_provider;

pub struct Session<'a> {
    agent: Agent,
    prompt: Box<dyn Prompt + 'a>,
    mcp_url: String,
}

impl<'a> Session<'a> {
    pub fn new(agent: Agent, prompt: Box<impl Prompt + 'a>, mcp_url: String) -> Self {
        Session {
            agent,
            prompt,
            mcp_url,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        self.setup_session();

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        self.agent_process_message(content).await;
                    }
                }
                InputType::Clear => {
                    self.agent.reset();
                    self.prompt
                        .render(&raw_message("Started a new conversation.\n"));
                }
                InputType::History => self.render_history(),
                InputType::Exit => break,
                InputType::AskAgain => continue,
            }
        }
        self.close_session();
        Ok(())
    }

    /// Answer a single message and stop
    pub async fn headless_start(&mut self, message: &str) -> Result<()> {
        self.agent_process_message(message).await;
        self.prompt.close();
        Ok(())
    }

    async fn agent_process_message(&mut self, text: &str) {
        let seen = self.agent.history().len();

        self.prompt.show_busy();
        let answer = self.agent.send(text, Some(DEFAULT_SYSTEM_PROMPT)).await;
        self.prompt.hide_busy();

        let new_turns = &self.agent.history()[seen..];
        info!(turns = new_turns.len(), "turn complete");

        // the recorded answer is rendered from `answer` below, along with unrecorded ones
        let answer_recorded = match new_turns.last() {
            Some(turn @ Turn::Assistant { .. }) => {
                turn.tool_requests().is_empty() && turn.text() == answer
            }
            _ => false,
        };
        let shown = if answer_recorded {
            &new_turns[..new_turns.len() - 1]
        } else {
            new_turns
        };
        for turn in shown {
            if matches!(turn, Turn::Assistant { .. } | Turn::ToolResult { .. }) {
                self.prompt.render(turn);
            }
        }
        self.prompt.render(&raw_message(&answer));
    }

    fn render_history(&mut self) {
        if self.agent.history().is_empty() {
            self.prompt.render(&raw_message("Nothing here yet.\n"));
            return;
        }
        for turn in self.agent.history() {
            self.prompt.render(turn);
        }
    }

    fn setup_session(&mut self) {
        self.prompt.render(&raw_message(&format!(
            "Starting session. Using the StackQL MCP server at {}\n",
            self.mcp_url
        )));
        self.prompt.ready();
    }

    fn close_session(&mut self) {
        self.prompt.render(&raw_message("Closing session.\n"));
        self.prompt.close();
    }
}

fn raw_message(content: &str) -> Turn {
    Turn::assistant(content)
}

#[cfg(test)]
mod tests {
    use super::mock_provider::{MockProvider, ProvidersOnlySystem};
    use super::*;
    use crate::prompt::Input;
    use serde_json::json;
    use stackql_agent::agent::ITERATION_LIMIT_MESSAGE;
    use stackql_agent::models::message::ToolRequest;
    use stackql_agent::models::role::Role;
    use stackql_agent::models::tool::ToolCall;
    use stackql_agent::providers::base::ModelReply;

    /// Plays back scripted input and keeps everything it was asked to render
    struct MockPrompt {
        inputs: Vec<Input>,
        rendered: Vec<Turn>,
        busy_count: usize,
    }

    impl MockPrompt {
        fn new(inputs: Vec<Input>) -> Self {
            Self {
                inputs,
                rendered: Vec::new(),
                busy_count: 0,
            }
        }

        fn rendered_text(&self) -> Vec<&str> {
            self.rendered.iter().map(Turn::text).collect()
        }
    }

    impl Prompt for MockPrompt {
        fn render(&mut self, turn: &Turn) {
            self.rendered.push(turn.clone());
        }

        fn get_input(&mut self) -> Result<Input> {
            if self.inputs.is_empty() {
                Ok(Input::command(InputType::Exit))
            } else {
                Ok(self.inputs.remove(0))
            }
        }

        fn show_busy(&mut self) {
            self.busy_count += 1;
        }

        fn hide_busy(&self) {}

        fn close(&self) {}

        fn ready(&self) {}

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn mock_prompt<'s>(session: &'s Session) -> &'s MockPrompt {
        session
            .prompt
            .as_any()
            .downcast_ref::<MockPrompt>()
            .unwrap()
    }

    fn list_providers_request(id: &str) -> ModelReply {
        ModelReply::tool_requests(vec![ToolRequest::new(
            id,
            Ok(ToolCall::new("list_providers", json!({}))),
        )])
    }

    fn session(provider: MockProvider, inputs: Vec<Input>) -> Session<'static> {
        let agent = Agent::new(Box::new(provider), Box::new(ProvidersOnlySystem::new()));
        Session::new(
            agent,
            Box::new(MockPrompt::new(inputs)),
            "http://127.0.0.1:9912".to_string(),
        )
    }

    #[tokio::test]
    async fn test_session_renders_tool_round_trip() {
        let provider = MockProvider::new(vec![
            list_providers_request("call_1"),
            ModelReply::text("You can use google, aws and azure."),
        ]);
        let mut session = session(
            provider,
            vec![Input::message("What cloud providers are available?")],
        );

        session.start().await.unwrap();

        let prompt = mock_prompt(&session);
        assert_eq!(prompt.busy_count, 1);
        let roles: Vec<Role> = prompt.rendered.iter().map(Turn::role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Assistant, // starting banner
                Role::Assistant, // tool request
                Role::Tool,
                Role::Assistant, // answer
                Role::Assistant, // closing banner
            ]
        );
        assert_eq!(prompt.rendered[1].tool_requests()[0].name, "list_providers");
        assert_eq!(prompt.rendered[2].text(), "google\naws\nazure");
        assert_eq!(prompt.rendered[3].text(), "You can use google, aws and azure.");
        assert_eq!(session.agent.history().len(), 5);
    }

    #[tokio::test]
    async fn test_session_sends_system_prompt_on_first_message_and_after_clear() {
        let provider = MockProvider::new(vec![
            ModelReply::text("one"),
            ModelReply::text("two"),
            ModelReply::text("three"),
        ]);
        let mut session = session(
            provider.clone(),
            vec![
                Input::message("first"),
                Input::message("second"),
                Input::command(InputType::Clear),
                Input::message("third"),
            ],
        );

        session.start().await.unwrap();

        let transcripts = provider.transcripts();
        assert_eq!(transcripts.len(), 3);
        assert_eq!(transcripts[0][0].role(), Role::System);
        assert_eq!(transcripts[0][0].text(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(transcripts[1].len(), 4);
        assert_eq!(
            transcripts[1]
                .iter()
                .filter(|turn| turn.role() == Role::System)
                .count(),
            1
        );
        assert_eq!(transcripts[2][0].role(), Role::System);
        assert_eq!(transcripts[2].len(), 2);

        let prompt = mock_prompt(&session);
        assert!(prompt
            .rendered_text()
            .contains(&"Started a new conversation.\n"));
    }

    #[tokio::test]
    async fn test_session_shows_unrecorded_answers() {
        let provider = MockProvider::new(vec![
            list_providers_request("a"),
            list_providers_request("b"),
        ]);
        let agent = Agent::new(Box::new(provider), Box::new(ProvidersOnlySystem::new()))
            .with_max_iterations(2);
        let mut session = Session::new(
            agent,
            Box::new(MockPrompt::new(vec![Input::message("loop forever")])),
            "http://127.0.0.1:9912".to_string(),
        );

        session.start().await.unwrap();

        let prompt = mock_prompt(&session);
        let texts = prompt.rendered_text();
        assert_eq!(texts[texts.len() - 2], ITERATION_LIMIT_MESSAGE);
    }

    #[tokio::test]
    async fn test_history_renders_the_conversation() {
        let provider = MockProvider::new(vec![ModelReply::text("Hello there.")]);
        let mut session = session(
            provider,
            vec![Input::message("hi"), Input::command(InputType::History)],
        );

        session.start().await.unwrap();

        let prompt = mock_prompt(&session);
        let roles: Vec<Role> = prompt.rendered.iter().map(Turn::role).collect();
        // banner, answer, then system + user + assistant from history, then closing
        assert_eq!(
            roles,
            vec![
                Role::Assistant,
                Role::Assistant,
                Role::System,
                Role::User,
                Role::Assistant,
                Role::Assistant,
            ]
        );
    }

    #[tokio::test]
    async fn test_headless_start() {
        let provider = MockProvider::new(vec![ModelReply::text("Just one answer.")]);
        let mut session = session(provider, vec![]);

        session.headless_start("Anything?").await.unwrap();

        let prompt = mock_prompt(&session);
        assert_eq!(prompt.rendered_text(), vec!["Just one answer."]);
    }
}
