//! Interactive question/answer prompt
//!
//! The orchestrator only ever asks closed questions with a fixed answer set
//! and a default. The trait keeps the core testable and lets
//! `--non-interactive` swap in an implementation that always takes the
//! default.

use std::io::{BufRead, Write};

/// Narrow interface to the interactive prompt collaborator
pub trait Prompt {
    /// Ask a closed question and return one of `valid_answers`
    fn query(&mut self, question: &str, valid_answers: &[&str], default: &str) -> String;
}

/// Prompt reading answers from the terminal
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    /// Create a new console prompt
    pub fn new() -> Self {
        Self
    }
}

/// Render the answer set, marking the default in upper case
fn format_answers(valid_answers: &[&str], default: &str) -> String {
    let rendered: Vec<String> = valid_answers
        .iter()
        .map(|answer| {
            if *answer == default {
                if answer.chars().all(char::is_numeric) {
                    format!("{answer}(*)")
                } else {
                    answer.to_uppercase()
                }
            } else {
                (*answer).to_string()
            }
        })
        .collect();
    rendered.join("/")
}

impl Prompt for ConsolePrompt {
    fn query(&mut self, question: &str, valid_answers: &[&str], default: &str) -> String {
        let rendered = format_answers(valid_answers, default);
        let stdin = std::io::stdin();
        loop {
            print!("{question} [{rendered}] ");
            let _ = std::io::stdout().flush();

            let mut line = String::new();
            if stdin.lock().read_line(&mut line).is_err() {
                return default.to_string();
            }
            let answer = line.trim();
            if answer.is_empty() {
                return default.to_string();
            }
            if valid_answers.contains(&answer) {
                return answer.to_string();
            }
        }
    }
}

/// Prompt that always takes the default answer (`--non-interactive`)
#[derive(Debug, Default)]
pub struct NonInteractivePrompt;

impl NonInteractivePrompt {
    /// Create a new non-interactive prompt
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for NonInteractivePrompt {
    fn query(&mut self, question: &str, _valid_answers: &[&str], default: &str) -> String {
        tracing::debug!(question, default, "non-interactive prompt answered with default");
        default.to_string()
    }
}
