//! Default configuration values

/// Title printed at the top of a bootstrap run
pub const MAIN_TITLE: &str = "Anvil IDE bootstrap build";

/// Directory that receives downloaded source archives
pub const DOWNLOADS_DIR: &str = "Downloads";

/// Directory that receives extracted sources and build output
pub const BUILD_DIR: &str = "Build";

/// Directory that receives per-project build tool logs
pub const LOGS_DIR: &str = "Logs";

/// File name of the persisted resumable state snapshot
pub const STATE_FILE: &str = "state.json";

/// Directory created next to the workspace for the second bootstrap phase
pub const SECOND_PHASE_DIR: &str = "SecondPhaseBootstrap";

/// Branch archived when a project does not pin one
pub const DEFAULT_BRANCH: &str = "master";

/// Required external dependency variables checked before any download
pub const REQUIRED_ENV_VARS: &[&str] = &["BOOST"];

/// CMake release used when no system installation is found
pub const CMAKE_VERSION: &str = "3.12.3";

/// Architecture directory name for 32-bit builds
pub const ARCH_DIR_32: &str = "Win32";

/// Architecture directory name for 64-bit builds
pub const ARCH_DIR_64: &str = "x64";
