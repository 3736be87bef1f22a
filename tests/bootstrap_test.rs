//! End-to-end pipeline tests
//!
//! Runs the download and build phases against a mock archive host and
//! counting build tool doubles: a first run builds everything, a second run
//! replays as a no-op - no downloads, no extractions, no builds.

mod common;

use common::{source_archive_bytes, AnsweringPrompt, CountingTool, Sandbox};

use anvilboot::cli::output::StepOutput;
use anvilboot::config::Workspace;
use anvilboot::core::environment::Environment;
use anvilboot::core::orchestrator::{self, BootstrapOptions};
use anvilboot::core::project::{BuildStrategy, Project};
use anvilboot::core::registry::ProjectRegistry;
use anvilboot::core::state::ResumableState;
use anvilboot::infra::download::HttpClient;
use anvilboot::tools::{Architecture, BuildConfiguration, BuildToolset};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// ProjectA is download-only; ProjectB builds its extracted tree with CMake
fn test_registry(workspace: &Workspace) -> ProjectRegistry {
    ProjectRegistry::new(
        workspace,
        vec![
            Project::new("ProjectA", BuildStrategy::None),
            Project::new("ProjectB", BuildStrategy::CMake).with_build_file("Build/ProjectB"),
        ],
    )
    .unwrap()
}

fn test_configuration() -> BuildConfiguration {
    BuildConfiguration::new("Debug", Architecture::X64, "VC15")
}

async fn mount_archives(server: &MockServer) {
    for name in ["ProjectA", "ProjectB"] {
        Mock::given(method("GET"))
            .and(path(format!("/anvil-ide/{name}/archive/master.zip")))
            .respond_with(
                ResponseTemplate::new(200).set_body_bytes(source_archive_bytes(name, "master")),
            )
            // Each archive may be fetched at most once across both runs
            .expect(1)
            .mount(server)
            .await;
    }
}

async fn run_once(
    workspace: &Workspace,
    toolset: &BuildToolset,
) -> Result<ResumableState, anvilboot::error::BootstrapError> {
    let mut registry = test_registry(workspace);
    let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
    let mut prompt = AnsweringPrompt::new(&[]);
    let mut output = StepOutput::new();
    let client = HttpClient::new();
    let env = Environment::new();

    orchestrator::download_phase(
        &mut registry,
        &mut state,
        &client,
        workspace,
        &mut prompt,
        &mut output,
        false,
    )
    .await?;

    orchestrator::run_pipeline(
        workspace,
        &mut registry,
        &mut state,
        toolset,
        &test_configuration(),
        &env,
        BootstrapOptions::default(),
        &mut prompt,
        &mut output,
    )?;
    Ok(state)
}

fn counting_toolset() -> (BuildToolset, CountingTool) {
    let cmake = CountingTool::succeeding("cmake");
    let toolset = BuildToolset::new(
        Box::new(cmake.clone()),
        Box::new(CountingTool::succeeding("solution")),
        Box::new(CountingTool::succeeding("anvilmake")),
    );
    (toolset, cmake)
}

#[tokio::test]
async fn first_run_builds_everything_second_run_is_a_noop() {
    let server = MockServer::start().await;
    mount_archives(&server).await;

    let sandbox = Sandbox::new();
    let workspace = Workspace::new(sandbox.path()).with_archive_base(&server.uri());

    // First run: everything downloads, extracts, and builds
    let (toolset, cmake) = counting_toolset();
    let state = run_once(&workspace, &toolset).await.unwrap();

    assert!(state.is_project_built("ProjectA"));
    assert!(state.is_project_built("ProjectB"));
    assert!(state.build_complete());
    assert_eq!(cmake.calls(), 1);
    assert!(sandbox.exists("Build/ProjectA/README.md"));
    assert!(sandbox.exists("Build/ProjectB/README.md"));

    // A sentinel left in the extracted tree must survive the second run:
    // nothing may be re-extracted
    sandbox.write_file("Build/ProjectB/sentinel.txt", "survives");

    // Second run: same outcome, zero downloads, zero extractions, zero builds
    let (toolset, cmake) = counting_toolset();
    let state = run_once(&workspace, &toolset).await.unwrap();

    assert!(state.is_project_built("ProjectA"));
    assert!(state.is_project_built("ProjectB"));
    assert!(state.build_complete());
    assert_eq!(cmake.calls(), 0);
    assert!(sandbox.exists("Build/ProjectB/sentinel.txt"));

    // Dropping the server verifies each archive was fetched exactly once
}

#[tokio::test]
async fn failed_build_resumes_at_the_failing_project() {
    let server = MockServer::start().await;
    mount_archives(&server).await;

    let sandbox = Sandbox::new();
    let workspace = Workspace::new(sandbox.path()).with_archive_base(&server.uri());

    // First run fails at ProjectB
    let failing_cmake = CountingTool::failing("cmake");
    let toolset = BuildToolset::new(
        Box::new(failing_cmake.clone()),
        Box::new(CountingTool::succeeding("solution")),
        Box::new(CountingTool::succeeding("anvilmake")),
    );
    let err = run_once(&workspace, &toolset).await.unwrap_err();
    assert!(matches!(err, anvilboot::error::BootstrapError::Build(_)));

    // ProjectA completed before the failure and is recorded as built
    let state = ResumableState::load_or_init(workspace.state_file()).unwrap();
    assert!(state.is_project_built("ProjectA"));
    assert!(!state.is_project_built("ProjectB"));
    assert!(!state.build_complete());
    drop(state);

    // Resuming builds only the project that failed
    let (toolset, cmake) = counting_toolset();
    let state = run_once(&workspace, &toolset).await.unwrap();

    assert!(state.is_project_built("ProjectB"));
    assert!(state.build_complete());
    assert_eq!(cmake.calls(), 1);
}

#[tokio::test]
async fn skip_downloads_runs_no_network_traffic() {
    let server = MockServer::start().await;
    // Any request at all violates this expectation
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let sandbox = Sandbox::new();
    let workspace = Workspace::new(sandbox.path()).with_archive_base(&server.uri());

    let mut registry = test_registry(&workspace);
    let mut state = ResumableState::load_or_init(workspace.state_file()).unwrap();
    let mut prompt = AnsweringPrompt::new(&[]);
    let mut output = StepOutput::new();
    let client = HttpClient::new();

    orchestrator::download_phase(
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

    assert!(state.download_complete());
}
