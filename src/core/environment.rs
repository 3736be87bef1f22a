//! Environment resolution
//!
//! Required external dependencies are checked against a snapshot of the
//! process environment, and one variable per project group is exported
//! pointing at the group's directory under the build root. The resolved map
//! is threaded explicitly to build tool subprocesses; the orchestrator never
//! mutates its own process environment.

use std::collections::BTreeMap;

use crate::config::{defaults, Workspace};
use crate::core::project::Project;
use crate::error::EnvError;

/// Resolved environment map for build tool invocations
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the full environment for a run
    ///
    /// `base` is a snapshot of the process environment (injected so tests
    /// need no process-level side effects). Every required dependency
    /// variable must be present in `base`; project bindings are derived and
    /// conflict-checked.
    pub fn resolve(
        base: &BTreeMap<String, String>,
        projects: &[Project],
        workspace: &Workspace,
    ) -> Result<Self, EnvError> {
        let mut env = Self::new();

        for required in defaults::REQUIRED_ENV_VARS {
            let value =
                base.get(*required)
                    .cloned()
                    .ok_or_else(|| EnvError::MissingDependency {
                        variable: (*required).to_string(),
                    })?;
            env.vars.insert((*required).to_string(), value);
        }

        for project in projects {
            if let Some((variable, value)) = project.env_binding(workspace) {
                let value = value.display().to_string();
                env.bind(&variable, &value)?;
            }
        }

        Ok(env)
    }

    /// Insert a binding, rejecting a differing value for an existing name
    pub fn bind(&mut self, variable: &str, value: &str) -> Result<(), EnvError> {
        if let Some(existing) = self.vars.get(variable) {
            if existing != value {
                return Err(EnvError::Conflict {
                    variable: variable.to_string(),
                    existing: existing.clone(),
                    incoming: value.to_string(),
                });
            }
            return Ok(());
        }
        self.vars.insert(variable.to_string(), value.to_string());
        Ok(())
    }

    /// Look up a variable
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.vars.get(variable).map(String::as_str)
    }

    /// Iterate over all bindings
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the environment is empty
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Snapshot the current process environment
pub fn process_env() -> BTreeMap<String, String> {
    std::env::vars().collect()
}
