use anyhow::Result;
use stackql_agent::models::message::Turn;

pub mod rustyline;
pub mod thinking;

/// The questions offered by `/examples`
pub const EXAMPLE_QUESTIONS: [&str; 7] = [
    "What cloud providers are available?",
    "Show me Google Cloud services",
    "List compute resources in Google Cloud",
    "What instances are running in my GCP project?",
    "Show me all my AWS EC2 instances",
    "List Azure virtual machines",
    "What GitHub repositories do I have access to?",
];

pub trait Prompt {
    fn render(&mut self, turn: &Turn);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&self);
    fn close(&self);
    fn ready(&self) {
        println!("\n");
        println!("Ask about your cloud infrastructure, or type /examples for some ideas.");
        println!("\n");
    }
    // Used for testing. Allows us to downcast to any type.
    #[cfg(test)]
    fn as_any(&self) -> &dyn std::any::Any;
}

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Optional content as sometimes the user may be issuing a command eg. (Exit)
}

impl Input {
    pub fn message<S: Into<String>>(text: S) -> Self {
        Input {
            input_type: InputType::Message,
            content: Some(text.into()),
        }
    }

    pub fn command(input_type: InputType) -> Self {
        Input {
            input_type,
            content: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Exit,     // User wants to exit the session
    Clear,    // Start the conversation over
    History,  // Show the conversation so far
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn bat_theme(&self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}
