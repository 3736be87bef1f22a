//! Output formatting and progress indicators
//!
//! The step-counter printer gives every phase of the bootstrap a numbered
//! heading and every archive within a phase a letter-suffixed substep, so a
//! multi-hour log can be correlated at a glance. Spinners come from
//! indicatif.

use indicatif::{ProgressBar, ProgressStyle};

/// Step-numbered console printer
#[derive(Debug)]
pub struct StepOutput {
    current_step: usize,
}

impl StepOutput {
    /// Create a printer starting at step 1
    pub fn new() -> Self {
        Self { current_step: 1 }
    }

    /// Print the main title with an underline
    pub fn print_main_title(&self, title: &str) {
        println!("{title}");
        println!("{}", "-".repeat(title.len()));
        println!();
    }

    /// Print the numbered title of the current step
    pub fn print_step_title(&self, title: &str) {
        println!("Step {}: {title}", self.current_step);
    }

    /// Print a letter-suffixed substep line
    pub fn print_substep(&self, label: char, message: &str) {
        println!("    Step {}{label}: {message}", self.current_step);
    }

    /// Print an indented detail line
    pub fn print_detail(&self, message: &str) {
        println!("    {message}");
    }

    /// Advance the step counter
    pub fn next_step(&mut self) {
        self.current_step += 1;
    }

    /// Current step number
    pub fn step(&self) -> usize {
        self.current_step
    }
}

impl Default for StepOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Substep label for the nth item of a phase
///
/// Purely cosmetic log correlation; indexes past `z` wrap into `z`.
pub fn substep_label(index: usize) -> char {
    let offset = u8::try_from(index.min(25)).expect("clamped to 25");
    char::from(b'a' + offset)
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";
}

/// Print a fatal error the way the binary reports it
pub fn display_error(error: &crate::error::BootstrapError) {
    eprintln!();
    eprintln!("{} ERROR: {error}", status::ERROR);
}
