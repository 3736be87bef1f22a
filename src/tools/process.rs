//! Subprocess invocation shared by the build tool adapters

use std::path::Path;
use std::process::Command;

use crate::core::environment::Environment;
use crate::error::BuildError;

/// Run a prepared command to completion, mapping failures to build errors
///
/// `tool` and `context` only feed error reports. A missing executable is
/// reported as the tool being absent, distinct from a failing build.
pub(crate) fn run(
    command: &mut Command,
    tool: &str,
    context: &Path,
) -> Result<(), BuildError> {
    tracing::debug!(?command, tool, "running build tool");
    let status = command.status().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BuildError::ToolNotFound {
                tool: tool.to_string(),
            }
        } else {
            BuildError::IoError {
                path: context.to_path_buf(),
                error: e.to_string(),
            }
        }
    })?;

    if !status.success() {
        return Err(BuildError::Failed {
            name: context.display().to_string(),
            error: status.to_string(),
        });
    }
    Ok(())
}

/// Apply an environment map to a command
pub(crate) fn apply_env(command: &mut Command, env: &Environment) {
    command.envs(env.iter());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_reports_tool_not_found() {
        let mut command = Command::new("definitely-not-a-real-tool-anywhere");
        let err = run(&mut command, "AnvilMake", Path::new("build.amk")).unwrap_err();
        assert!(matches!(err, BuildError::ToolNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_reports_build_failure() {
        let mut command = Command::new("false");
        let err = run(&mut command, "sh", Path::new("build.amk")).unwrap_err();
        assert!(matches!(err, BuildError::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_is_success() {
        let mut command = Command::new("true");
        assert!(run(&mut command, "sh", Path::new("build.amk")).is_ok());
    }
}
