//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use anvilboot::cli::prompt::Prompt;
use anvilboot::error::BuildError;
use anvilboot::tools::BuildTool;

/// Scratch workspace for one bootstrap scenario
pub struct Sandbox {
    /// Temporary directory backing the workspace
    pub dir: TempDir,
}

impl Sandbox {
    /// Create a new scratch workspace
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Root path of the workspace
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Check if a path exists relative to the workspace
    #[allow(dead_code)]
    pub fn exists(&self, relative: &str) -> bool {
        self.dir.path().join(relative).exists()
    }

    /// Write a file relative to the workspace
    #[allow(dead_code)]
    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Zip bytes of a branch snapshot archive with a `{name}-{branch}/` root
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

/// Build tool double counting invocations
#[derive(Debug, Clone)]
pub struct CountingTool {
    name: String,
    succeed: bool,
    calls: Arc<AtomicUsize>,
    built_files: Arc<Mutex<Vec<PathBuf>>>,
}

impl CountingTool {
    /// A tool whose builds always succeed
    pub fn succeeding(name: &str) -> Self {
        Self::new(name, true)
    }

    /// A tool whose builds always fail
    #[allow(dead_code)]
    pub fn failing(name: &str) -> Self {
        Self::new(name, false)
    }

    fn new(name: &str, succeed: bool) -> Self {
        Self {
            name: name.to_string(),
            succeed,
            calls: Arc::new(AtomicUsize::new(0)),
            built_files: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of build invocations
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Build files passed to the tool, in order
    #[allow(dead_code)]
    pub fn built_files(&self) -> Vec<PathBuf> {
        self.built_files.lock().unwrap().clone()
    }
}

impl BuildTool for CountingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&self, build_file: &Path, _configuration: &str) -> Result<(), BuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.built_files
            .lock()
            .unwrap()
            .push(build_file.to_path_buf());
        if self.succeed {
            Ok(())
        } else {
            Err(BuildError::Failed {
                name: build_file.display().to_string(),
                error: "exit status 1".to_string(),
            })
        }
    }
}

/// Prompt double replaying a fixed list of answers
#[derive(Debug)]
pub struct AnsweringPrompt {
    answers: Vec<String>,
    asked: usize,
}

impl AnsweringPrompt {
    /// Create a prompt that will answer with `answers`, in order
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(ToString::to_string).collect(),
            asked: 0,
        }
    }

    /// How many questions have been asked
    #[allow(dead_code)]
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl Prompt for AnsweringPrompt {
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
