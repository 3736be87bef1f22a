//! Test utilities
//!
//! Doubles for the prompt and build tool seams, archive fixtures, and
//! proptest generators.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::cli::prompt::Prompt;
use crate::error::BuildError;
use crate::tools::BuildTool;

/// Prompt double replaying a fixed list of answers
///
/// Panics when asked more questions than it has answers - tests declare
/// exactly the interaction they expect.
#[derive(Debug)]
pub struct ScriptedPrompt {
    answers: Vec<String>,
    asked: usize,
}

impl ScriptedPrompt {
    /// Create a prompt that will answer with `answers`, in order
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(ToString::to_string).collect(),
            asked: 0,
        }
    }

    /// How many questions have been asked
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn query(&mut self, question: &str, _valid_answers: &[&str], _default: &str) -> String {
        let answer = self
            .answers
            .get(self.asked)
            .unwrap_or_else(|| panic!("unexpected prompt: {question}"))
            .clone();
        self.asked += 1;
        answer
    }
}

/// Build tool double recording calls and configurations
#[derive(Debug, Clone)]
pub struct RecordingTool {
    name: String,
    succeed: bool,
    calls: Arc<AtomicUsize>,
    launches: Arc<AtomicUsize>,
    last_configuration: Arc<Mutex<Option<String>>>,
}

impl RecordingTool {
    /// A tool whose builds always succeed
    pub fn succeeding(name: &str) -> Self {
        Self::new(name, true)
    }

    /// A tool whose builds always fail
    pub fn failing(name: &str) -> Self {
        Self::new(name, false)
    }

    fn new(name: &str, succeed: bool) -> Self {
        Self {
            name: name.to_string(),
            succeed,
            calls: Arc::new(AtomicUsize::new(0)),
            launches: Arc::new(AtomicUsize::new(0)),
            last_configuration: Arc::new(Mutex::new(None)),
        }
    }

    /// Number of build invocations
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of launch invocations
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Configuration string of the most recent build
    pub fn last_configuration(&self) -> Option<String> {
        self.last_configuration.lock().unwrap().clone()
    }
}

impl BuildTool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, build_file: &Path, configuration: &str) -> Result<(), BuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_configuration.lock().unwrap() = Some(configuration.to_string());
        if self.succeed {
            Ok(())
        } else {
            Err(BuildError::Failed {
                name: build_file.display().to_string(),
                error: "exit status 1".to_string(),
            })
        }
    }

    fn launch(&self, _build_file: &Path) -> Result<(), BuildError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Zip bytes of a source archive as the hosting service would serve it
///
/// The archive contains a single `{name}-{branch}/` top-level directory
/// with a README inside, mirroring a branch snapshot download.
pub fn source_archive_bytes(name: &str, branch: &str) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        zip.add_directory(format!("{name}-{branch}/"), options)
            .unwrap();
        zip.start_file(format!("{name}-{branch}/README.md"), options)
            .unwrap();
        zip.write_all(format!("# {name}\n").as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    cursor.into_inner()
}

/// Proptest generators
pub mod generators {
    use proptest::prelude::*;

    /// Generate a repository name
    pub fn repo_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9]{0,20}"
    }

    /// Generate a branch name
    pub fn branch_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("master".to_string()),
            Just("main".to_string()),
            "[a-z][a-z0-9-]{0,12}",
        ]
    }
}
