use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;
use stackql_agent::models::message::{ToolRequest, Turn};

use super::{
    thinking::get_random_thinking_message, Input, InputType, Prompt, Theme, EXAMPLE_QUESTIONS,
};

const PROMPT: &str = "\x1b[1m\x1b[38;5;30mstackql> \x1b[0m";
const MAX_STRING_LENGTH: usize = 80;
const MAX_RESULT_LINES: usize = 25;
const INDENT: &str = "    ";

pub struct RustylinePrompt {
    editor: DefaultEditor,
    spinner: cliclack::ProgressBar,
    theme: Theme,
}

impl RustylinePrompt {
    pub fn new() -> Result<Self> {
        Ok(RustylinePrompt {
            editor: DefaultEditor::new()?,
            spinner: spinner(),
            theme: Theme::Dark,
        })
    }
}

/// Turn one line of input into a message or a session command
fn interpret(line: &str, theme: &mut Theme) -> Input {
    let text = line.trim();
    if text.is_empty() {
        return Input::command(InputType::AskAgain);
    }

    let (command, argument) = match text.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (text, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "/exit" | "/quit" => Input::command(InputType::Exit),
        "/clear" => Input::command(InputType::Clear),
        "/history" => Input::command(InputType::History),
        "/t" => {
            *theme = theme.toggled();
            match theme {
                Theme::Light => println!("Switching to Light theme"),
                Theme::Dark => println!("Switching to Dark theme"),
            }
            Input::command(InputType::AskAgain)
        }
        "/examples" if argument.is_empty() => {
            print_examples();
            Input::command(InputType::AskAgain)
        }
        "/examples" => {
            let question = argument
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| EXAMPLE_QUESTIONS.get(index));
            match question {
                Some(question) => {
                    println!("{} {}", style(">").dim(), question);
                    Input::message(*question)
                }
                None => {
                    println!(
                        "No example {}. Pick a number between 1 and {}.",
                        argument,
                        EXAMPLE_QUESTIONS.len()
                    );
                    Input::command(InputType::AskAgain)
                }
            }
        }
        "/?" | "/help" => {
            print_help();
            Input::command(InputType::AskAgain)
        }
        _ => Input::message(text),
    }
}

fn print_help() {
    println!("Commands:");
    println!("/exit | /quit - Exit the session");
    println!("/clear - Start a new conversation");
    println!("/history - Show the conversation so far");
    println!("/examples [n] - List example questions, or ask example n");
    println!("/t - Toggle Light/Dark theme");
    println!("/? | /help - Display this help message");
}

fn print_examples() {
    println!("Example questions:");
    for (i, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
        println!("{}{} {}", INDENT, style(format!("{}.", i + 1)).dim(), question);
    }
    println!("Ask one with /examples <n>");
}

fn print_request_header(name: &str) {
    let tool_header = format!(
        "─── {} | {} ──────────────────────────",
        style(name),
        style("stackql").magenta().dim(),
    );
    print_newline();
    println!("{}", tool_header);
}

fn render_request(request: &ToolRequest, theme: &str) {
    print_request_header(&request.name);
    match &request.tool_call {
        Ok(call) => match call.arguments.get("sql") {
            Some(Value::String(sql)) => print_highlighted(sql, "SQL", theme),
            _ => print_params(&call.arguments, 0),
        },
        Err(e) => println!("{}", style(e.to_string()).red()),
    }
}

fn render_result(content: &str) {
    if content.starts_with("Error executing") || content.starts_with("Unknown tool") {
        println!("{}", style(content).red());
        return;
    }

    let lines: Vec<&str> = content.lines().collect();
    for line in lines.iter().take(MAX_RESULT_LINES) {
        println!("{}{}", INDENT, style(line).dim());
    }
    if lines.len() > MAX_RESULT_LINES {
        println!(
            "{}{}",
            INDENT,
            style(format!("... {} more lines", lines.len() - MAX_RESULT_LINES)).dim()
        );
    }
}

fn print_highlighted(content: &str, language: &str, theme: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language(language)
        .wrapping_mode(WrappingMode::Character)
        .print();
    if printed.is_err() {
        println!("{}", content);
    }
}

/// Format and print parameters recursively with proper indentation and colors
fn print_params(value: &Value, depth: usize) {
    let indent = INDENT.repeat(depth);

    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) | Value::Array(_) => {
                        println!("{}{}:", indent, style(key).dim());
                        print_params(val, depth + 1);
                    }
                    Value::String(s) if s.len() > MAX_STRING_LENGTH => {
                        println!(
                            "{}{}: {}",
                            indent,
                            style(key).dim(),
                            style(format!("[{} chars]", s.len())).yellow()
                        );
                    }
                    Value::String(s) => {
                        println!("{}{}: {}", indent, style(key).dim(), style(s).green());
                    }
                    other => {
                        println!("{}{}: {}", indent, style(key).dim(), style(other).blue());
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("{}{}.", indent, i + 1);
                print_params(item, depth + 1);
            }
        }
        Value::String(s) => println!("{}{}", indent, style(s).green()),
        other => println!("{}{}", indent, style(other).yellow()),
    }
}

fn print_newline() {
    println!();
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, turn: &Turn) {
        let theme = self.theme.bat_theme();

        match turn {
            Turn::System { .. } => return,
            Turn::User { content, .. } => {
                println!("{} {}", style("you>").cyan().bold(), content);
            }
            Turn::Assistant {
                content,
                tool_requests,
                ..
            } => {
                if !content.trim().is_empty() {
                    print_highlighted(content, "Markdown", theme);
                }
                for request in tool_requests {
                    render_request(request, theme);
                }
            }
            Turn::ToolResult { content, .. } => render_result(content),
        }

        print_newline();
        let _ = io::stdout().flush();
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner
            .start(format!("{}...", get_random_thinking_message()));
    }

    fn hide_busy(&self) {
        self.spinner.stop("");
    }

    fn get_input(&mut self) -> Result<Input> {
        match self.editor.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(interpret(&line, &mut self.theme))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                Ok(Input::command(InputType::Exit))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn close(&self) {
        // No cleanup required
    }

    #[cfg(test)]
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(line: &str) -> Input {
        let mut theme = Theme::Dark;
        interpret(line, &mut theme)
    }

    #[test]
    fn test_plain_text_is_a_message() {
        let input = run("  What cloud providers are available?  ");
        assert_eq!(input.input_type, InputType::Message);
        assert_eq!(
            input.content.as_deref(),
            Some("What cloud providers are available?")
        );
    }

    #[test]
    fn test_session_commands() {
        assert_eq!(run("/exit").input_type, InputType::Exit);
        assert_eq!(run("/QUIT").input_type, InputType::Exit);
        assert_eq!(run("/clear").input_type, InputType::Clear);
        assert_eq!(run("/history").input_type, InputType::History);
        assert_eq!(run("/help").input_type, InputType::AskAgain);
        assert_eq!(run("   ").input_type, InputType::AskAgain);
    }

    #[test]
    fn test_unknown_slash_text_is_sent() {
        let input = run("/usr/bin is not a command");
        assert_eq!(input.input_type, InputType::Message);
    }

    #[test]
    fn test_theme_toggle() {
        let mut theme = Theme::Dark;
        let input = interpret("/t", &mut theme);
        assert_eq!(input.input_type, InputType::AskAgain);
        assert_eq!(theme, Theme::Light);
        interpret("/t", &mut theme);
        assert_eq!(theme, Theme::Dark);
    }

    #[test]
    fn test_examples() {
        assert_eq!(run("/examples").input_type, InputType::AskAgain);

        let input = run("/examples 2");
        assert_eq!(input.input_type, InputType::Message);
        assert_eq!(input.content.as_deref(), Some("Show me Google Cloud services"));

        assert_eq!(run("/examples 0").input_type, InputType::AskAgain);
        assert_eq!(run("/examples 8").input_type, InputType::AskAgain);
        assert_eq!(run("/examples two").input_type, InputType::AskAgain);
    }
}
