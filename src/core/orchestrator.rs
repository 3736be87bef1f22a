//! Bootstrap orchestration
//!
//! Sequences one run: restore-or-reset state, resolve the target
//! architecture and environment, download, then unzip and build each
//! project in declared order, persisting state after every step so a second
//! invocation replays completed phases as cheap no-ops. Any error aborts
//! the run.

use std::collections::BTreeMap;

use crate::cli::output::StepOutput;
use crate::cli::prompt::Prompt;
use crate::config::{defaults, Workspace};
use crate::core::environment::{self, Environment};
use crate::core::registry::{self, ProjectRegistry};
use crate::core::state::ResumableState;
use crate::error::{BootstrapError, BuildError};
use crate::infra::{download::HttpClient, filesystem};
use crate::tools::anvilmake::AnvilMakeTool;
use crate::tools::cmake::{self, CMakeTool};
use crate::tools::compiler::{self, CompilerInfo, SolutionTool};
use crate::tools::{Architecture, BuildConfiguration, BuildToolset};

/// Flags controlling one run
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapOptions {
    /// Skip the download phase entirely
    pub skip_downloads: bool,
    /// Skip the test phase
    pub skip_tests: bool,
}

/// Offer to resume a previously interrupted run
///
/// Declining resets the persisted state and discards the build directory.
pub fn try_restore_previous_state(
    state: &mut ResumableState,
    workspace: &Workspace,
    prompt: &mut dyn Prompt,
) -> Result<(), BootstrapError> {
    if !state.previous_state_found() {
        return Ok(());
    }
    let resume = prompt.query(
        "Previous execution detected. Do you want to resume it?",
        &["y", "n"],
        "n",
    );
    if resume == "n" {
        state.reset()?;
        filesystem::remove_dir_with_retry(&workspace.build_dir(), prompt)?;
    }
    Ok(())
}

fn is_64bit_host() -> bool {
    matches!(std::env::consts::ARCH, "x86_64" | "aarch64")
}

/// Choose the target architecture, reusing a previous selection
pub fn select_architecture(
    state: &mut ResumableState,
    prompt: &mut dyn Prompt,
    output: &mut StepOutput,
) -> Result<Architecture, BootstrapError> {
    println!();
    output.print_step_title("Architecture choice");
    output.print_detail(&format!("Platform: {}", std::env::consts::OS));

    let selection = if state.architecture().is_empty() {
        if is_64bit_host() {
            prompt.query("    Select architecture.", &["32", "64"], "64")
        } else {
            output.print_detail("Only 32-bit build supported");
            "32".to_string()
        }
    } else {
        let previous = state.architecture().to_string();
        output.print_detail(&format!("Using previous selection: {previous}"));
        previous
    };

    state.set_architecture(&selection)?;
    output.next_step();
    Ok(Architecture::from_selection(&selection))
}

/// Check required dependencies and export per-group variables
pub fn resolve_environment(
    registry: &ProjectRegistry,
    workspace: &Workspace,
    base: &BTreeMap<String, String>,
    output: &mut StepOutput,
) -> Result<Environment, BootstrapError> {
    println!();
    output.print_step_title("Resolving environment");
    let env = Environment::resolve(base, registry.projects(), workspace)?;
    for (variable, value) in env.iter() {
        output.print_detail(&format!("{variable}: {value}"));
    }
    output.next_step();
    Ok(env)
}

/// Download all source packages, honoring completion state
///
/// A completed previous download phase short-circuits without touching the
/// network; the completion flag is re-recorded either way.
pub async fn download_phase(
    registry: &mut ProjectRegistry,
    state: &mut ResumableState,
    client: &HttpClient,
    workspace: &Workspace,
    prompt: &mut dyn Prompt,
    output: &mut StepOutput,
    skip: bool,
) -> Result<(), BootstrapError> {
    println!();
    output.print_step_title("Downloading source packages");
    if skip {
        output.print_detail("Skipping downloads");
    } else if state.download_complete() {
        output.print_detail("Using previous execution");
    } else {
        filesystem::remove_dir_with_retry(&workspace.downloads_dir(), prompt)?;
        registry.download(client, output).await?;
    }
    state.set_download_complete()?;
    output.next_step();
    Ok(())
}

/// Choose a compiler among the discovered installations
pub fn select_compiler(
    compilers: &[CompilerInfo],
    state: &mut ResumableState,
    prompt: &mut dyn Prompt,
    output: &mut StepOutput,
) -> Result<CompilerInfo, BootstrapError> {
    println!();
    output.print_step_title("Compiler choice");
    if compilers.is_empty() {
        return Err(BootstrapError::NoCompilerFound);
    }

    if !state.selected_compiler().is_empty() {
        if let Some(previous) = compilers
            .iter()
            .find(|c| c.name == state.selected_compiler())
        {
            output.print_detail(&format!("Using previous selection: {}", previous.name));
            output.next_step();
            return Ok(previous.clone());
        }
        output.print_detail(&format!(
            "{} Previous selection '{}' is no longer installed",
            crate::cli::output::status::WARNING,
            state.selected_compiler()
        ));
    }

    output.print_detail("The following compilers have been found");
    for (index, compiler) in compilers.iter().enumerate() {
        output.print_detail(&format!("    {}) {}", index + 1, compiler.name));
    }

    let selected = if compilers.len() == 1 {
        compilers[0].clone()
    } else {
        let numbers: Vec<String> = (1..=compilers.len()).map(|i| i.to_string()).collect();
        let answers: Vec<&str> = numbers.iter().map(String::as_str).collect();
        let answer = prompt.query("    Select compiler.", &answers, "1");
        let index = answer.parse::<usize>().unwrap_or(1).saturating_sub(1);
        compilers[index.min(compilers.len() - 1)].clone()
    };

    state.set_selected_compiler(&selected.name)?;
    output.next_step();
    Ok(selected)
}

/// Choose the build configuration, reusing a previous selection
pub fn select_configuration(
    state: &mut ResumableState,
    prompt: &mut dyn Prompt,
    output: &mut StepOutput,
) -> Result<String, BootstrapError> {
    println!();
    output.print_step_title("Configuration choice");
    let configuration = if state.build_configuration().is_empty() {
        prompt.query("    Choose configuration.", &["Debug", "Release"], "Debug")
    } else {
        let previous = state.build_configuration().to_string();
        output.print_detail(&format!("Using previous selection: {previous}"));
        previous
    };
    state.set_build_configuration(&configuration)?;
    output.next_step();
    Ok(configuration)
}

/// Unzip and build every project in declared order
///
/// Already-built projects are re-marked without re-running anything, which
/// is what makes a resumed run a cheap replay up to the first incomplete
/// project. State persists after every project.
pub fn build_phase(
    registry: &mut ProjectRegistry,
    toolset: &BuildToolset,
    config: &BuildConfiguration,
    workspace: &Workspace,
    state: &mut ResumableState,
    prompt: &mut dyn Prompt,
    output: &mut StepOutput,
) -> Result<(), BootstrapError> {
    println!();
    output.print_step_title("Building projects");
    let (projects, downloads) = registry.parts_mut();
    for project in projects.iter_mut() {
        if state.is_project_built(project.name()) {
            output.print_detail(&format!("{}: using previous execution", project.name()));
            project.mark_built();
        } else {
            output.print_detail(&format!("{}: building", project.name()));
            project.unzip(downloads, workspace)?;
            project.build(toolset, config, workspace, prompt)?;
        }
        state.set_built_project(project.name())?;
    }
    output.next_step();
    Ok(())
}

/// Run every declared test executable
pub fn test_phase(
    registry: &ProjectRegistry,
    config: &BuildConfiguration,
    workspace: &Workspace,
    env: &Environment,
    output: &mut StepOutput,
    skip: bool,
) -> Result<(), BootstrapError> {
    println!();
    output.print_step_title("Running tests");
    if skip {
        output.print_detail("Skipping tests");
    } else {
        for project in registry.projects() {
            if project.run_tests(workspace, config, env)? {
                output.print_detail(&format!(
                    "{} {}: tests passed",
                    crate::cli::output::status::SUCCESS,
                    project.name()
                ));
            }
        }
    }
    output.next_step();
    Ok(())
}

/// Stage the built artifact for the second bootstrap phase
pub fn staging_phase(
    registry: &ProjectRegistry,
    config: &BuildConfiguration,
    workspace: &Workspace,
    output: &mut StepOutput,
) -> Result<(), BootstrapError> {
    println!();
    output.print_step_title("Setting up second-phase of bootstrap");
    let staging_dir = workspace.second_phase_dir();
    filesystem::create_dir_all(&staging_dir)?;
    output.print_detail(&staging_dir.display().to_string());

    if let Some(project) = registry.staging_project() {
        let artifact = project
            .resolve_staging_artifact(workspace, config)?
            .expect("staging_project only yields projects with an artifact");
        if !artifact.exists() {
            return Err(BuildError::FileNotFound { path: artifact }.into());
        }
        let file_name = artifact
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        filesystem::copy_file(&artifact, &staging_dir.join(file_name))?;
    }
    output.next_step();
    Ok(())
}

/// Build, test, and stage with an assembled toolset
///
/// Everything after tool selection: the part of the run that is identical
/// whether the toolset came from host discovery or from a test harness.
pub fn run_pipeline(
    workspace: &Workspace,
    registry: &mut ProjectRegistry,
    state: &mut ResumableState,
    toolset: &BuildToolset,
    config: &BuildConfiguration,
    env: &Environment,
    options: BootstrapOptions,
    prompt: &mut dyn Prompt,
    output: &mut StepOutput,
) -> Result<(), BootstrapError> {
    build_phase(registry, toolset, config, workspace, state, prompt, output)?;
    state.set_build_complete()?;
    test_phase(registry, config, workspace, env, output, options.skip_tests)?;
    staging_phase(registry, config, workspace, output)?;
    Ok(())
}

/// Run the whole bootstrap against the host
pub async fn run_bootstrap(
    workspace: &Workspace,
    options: BootstrapOptions,
    prompt: &mut dyn Prompt,
    output: &mut StepOutput,
) -> Result<(), BootstrapError> {
    output.print_main_title(defaults::MAIN_TITLE);

    let mut state = ResumableState::load_or_init(workspace.state_file())?;
    try_restore_previous_state(&mut state, workspace, prompt)?;

    let architecture = select_architecture(&mut state, prompt, output)?;

    filesystem::create_dir_all(&workspace.build_dir())?;

    let mut registry = registry::default_bootstrap(workspace)?;
    let env = resolve_environment(&registry, workspace, &environment::process_env(), output)?;

    let client = HttpClient::new();
    download_phase(
        &mut registry,
        &mut state,
        &client,
        workspace,
        prompt,
        output,
        options.skip_downloads,
    )
    .await?;

    let compilers = compiler::discover();
    let selected = select_compiler(&compilers, &mut state, prompt, output)?;
    let configuration = select_configuration(&mut state, prompt, output)?;

    println!();
    output.print_step_title("Installing build tools");
    let cmake_path = cmake::install(workspace, architecture, &mut state, &client, output).await?;
    output.next_step();

    let config = BuildConfiguration::new(&configuration, architecture, &selected.short_name);
    let toolset = BuildToolset::new(
        Box::new(
            CMakeTool::new(cmake_path, workspace.logs_dir())
                .with_generator(&selected.generator_for(architecture))
                .with_env(env.clone()),
        ),
        Box::new(SolutionTool::new(selected).with_env(env.clone())),
        Box::new(AnvilMakeTool::new(workspace, architecture).with_env(env.clone())),
    );

    run_pipeline(
        workspace,
        &mut registry,
        &mut state,
        &toolset,
        &config,
        &env,
        options,
        prompt,
        output,
    )
}

/// Open a single project in the IDE instead of bootstrapping
///
/// Reuses the previous run's compiler and configuration selections where
/// present.
pub fn run_launch(
    workspace: &Workspace,
    project_name: &str,
    prompt: &mut dyn Prompt,
    output: &mut StepOutput,
) -> Result<(), BootstrapError> {
    let mut state = ResumableState::load_or_init(workspace.state_file())?;
    let architecture = select_architecture(&mut state, prompt, output)?;

    let compilers = compiler::discover();
    let selected = select_compiler(&compilers, &mut state, prompt, output)?;
    let configuration = if state.build_configuration().is_empty() {
        "Debug".to_string()
    } else {
        state.build_configuration().to_string()
    };

    let registry = registry::default_bootstrap(workspace)?;
    let project = registry
        .get(project_name)
        .ok_or_else(|| BootstrapError::UnknownProject {
            name: project_name.to_string(),
        })?;

    let config = BuildConfiguration::new(&configuration, architecture, &selected.short_name);
    let toolset = BuildToolset::new(
        Box::new(CMakeTool::new("cmake", workspace.logs_dir())),
        Box::new(SolutionTool::new(selected)),
        Box::new(AnvilMakeTool::new(workspace, architecture)),
    );
    project.launch(&toolset, &config, workspace)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::{BuildStrategy, Project};
    use crate::test_utils::ScriptedPrompt;
    use tempfile::TempDir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn empty_registry(workspace: &Workspace) -> ProjectRegistry {
        ProjectRegistry::new(workspace, vec![]).unwrap()
    }

    #[tokio::test]
    async fn test_completed_download_phase_makes_no_network_calls() {
        let mock_server = MockServer::start().await;
        // Any request at all would violate the expectation
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path()).with_archive_base(&mock_server.uri());
        let mut registry = ProjectRegistry::new(
            &workspace,
            vec![Project::new("Anvil/Errors", BuildStrategy::None)],
        )
        .unwrap();

        let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
        state.set_download_complete().unwrap();

        let client = HttpClient::new();
        let mut prompt = ScriptedPrompt::new(&[]);
        let mut output = StepOutput::new();

        download_phase(
            &mut registry,
            &mut state,
            &client,
            &workspace,
            &mut prompt,
            &mut output,
            false,
        )
        .await
        .unwrap();

        assert!(state.download_complete());
    }

    #[tokio::test]
    async fn test_skip_downloads_flag_short_circuits() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        let mut registry = empty_registry(&workspace);
        let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
        let client = HttpClient::new();
        let mut prompt = ScriptedPrompt::new(&[]);
        let mut output = StepOutput::new();

        download_phase(
            &mut registry,
            &mut state,
            &client,
            &workspace,
            &mut prompt,
            &mut output,
            true,
        )
        .await
        .unwrap();

        // Bookkeeping still runs when the phase is skipped
        assert!(state.download_complete());
    }

    #[test]
    fn test_select_architecture_reuses_previous_selection() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
        state.set_architecture("32").unwrap();

        // No scripted answers: any prompt would panic
        let mut prompt = ScriptedPrompt::new(&[]);
        let mut output = StepOutput::new();

        let architecture = select_architecture(&mut state, &mut prompt, &mut output).unwrap();
        assert_eq!(architecture, Architecture::X86);
        assert_eq!(prompt.asked(), 0);
    }

    #[test]
    fn test_select_configuration_prompts_when_unset() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
        let mut prompt = ScriptedPrompt::new(&["Release"]);
        let mut output = StepOutput::new();

        let configuration = select_configuration(&mut state, &mut prompt, &mut output).unwrap();
        assert_eq!(configuration, "Release");
        assert_eq!(state.build_configuration(), "Release");

        // Second call reuses the stored value without prompting
        let mut prompt = ScriptedPrompt::new(&[]);
        let configuration = select_configuration(&mut state, &mut prompt, &mut output).unwrap();
        assert_eq!(configuration, "Release");
        assert_eq!(prompt.asked(), 0);
    }

    #[test]
    fn test_select_compiler_errors_when_none_found() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
        let mut prompt = ScriptedPrompt::new(&[]);
        let mut output = StepOutput::new();

        let err = select_compiler(&[], &mut state, &mut prompt, &mut output).unwrap_err();
        assert!(matches!(err, BootstrapError::NoCompilerFound));
    }

    #[test]
    fn test_declining_resume_resets_state_and_build_dir() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        {
            let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
            state.set_architecture("64").unwrap();
            state.set_download_complete().unwrap();
        }
        std::fs::create_dir_all(workspace.build_dir().join("Anvil")).unwrap();

        let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
        assert!(state.previous_state_found());

        let mut prompt = ScriptedPrompt::new(&["n"]);
        try_restore_previous_state(&mut state, &workspace, &mut prompt).unwrap();

        assert!(state.architecture().is_empty());
        assert!(!state.download_complete());
        assert!(!workspace.build_dir().exists());
    }

    #[test]
    fn test_accepting_resume_keeps_state() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path());
        {
            let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
            state.set_architecture("64").unwrap();
        }

        let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
        let mut prompt = ScriptedPrompt::new(&["y"]);
        try_restore_previous_state(&mut state, &workspace, &mut prompt).unwrap();

        assert_eq!(state.architecture(), "64");
    }
}
