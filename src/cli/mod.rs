//! Command-line interface module
//!
//! This module handles argument parsing, the interactive prompt, and output
//! formatting. It contains no bootstrap logic - that belongs in the
//! [`crate::core`] module.

pub mod output;
pub mod prompt;

use anyhow::Result;
use clap::Parser;

use crate::config::Workspace;
use crate::core::orchestrator::{self, BootstrapOptions};
use output::StepOutput;
use prompt::{ConsolePrompt, NonInteractivePrompt, Prompt};

/// Anvilboot - bootstrap build orchestrator for the Anvil IDE toolchain
///
/// Downloads, extracts, and builds the Anvil projects in order, resuming a
/// previously interrupted run where it left off.
#[derive(Parser, Debug)]
#[command(name = "anvilboot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Launch a project inside the IDE instead of bootstrapping
    #[arg(long, value_name = "PROJECTNAME")]
    pub launch: Option<String>,

    /// Run without prompting, taking every default answer
    #[arg(long)]
    pub non_interactive: bool,

    /// Skip the download of the source packages
    #[arg(long)]
    pub skip_downloads: bool,

    /// Skip the tests
    #[arg(long)]
    pub skip_tests: bool,

    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Execute the parsed command line against the given workspace
    pub async fn run(self, workspace: &Workspace) -> Result<()> {
        let mut prompt: Box<dyn Prompt> = if self.non_interactive {
            Box::new(NonInteractivePrompt::new())
        } else {
            Box::new(ConsolePrompt::new())
        };
        let mut output = StepOutput::new();

        if let Some(project_name) = &self.launch {
            orchestrator::run_launch(workspace, project_name, prompt.as_mut(), &mut output)?;
            return Ok(());
        }

        let options = BootstrapOptions {
            skip_downloads: self.skip_downloads,
            skip_tests: self.skip_tests,
        };
        orchestrator::run_bootstrap(workspace, options, prompt.as_mut(), &mut output).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from([
            "anvilboot",
            "--non-interactive",
            "--skip-downloads",
            "--skip-tests",
        ]);
        assert!(cli.non_interactive);
        assert!(cli.skip_downloads);
        assert!(cli.skip_tests);
        assert!(cli.launch.is_none());
    }

    #[test]
    fn launch_takes_a_project_name() {
        let cli = Cli::parse_from(["anvilboot", "--launch", "AnvilIDE/Workbench"]);
        assert_eq!(cli.launch.as_deref(), Some("AnvilIDE/Workbench"));
    }
}
