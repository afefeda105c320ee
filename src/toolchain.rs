// src/toolchain.rs
use crate::config::ToolchainConfig;
use crate::runner;
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;

/// State of the compiler executable, decided once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ToolchainStatus {
    /// The executable was already on disk.
    Present,
    /// The executable was built from source during startup.
    Built,
    /// Neither the executable nor its source could be found.
    Missing(String),
    /// The startup build ran and failed.
    BuildFailed(String),
}

impl ToolchainStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ToolchainStatus::Present | ToolchainStatus::Built)
    }

    /// Why the executable is unusable, if startup recorded a reason.
    pub fn failure(&self) -> Option<&str> {
        match self {
            ToolchainStatus::Missing(reason) | ToolchainStatus::BuildFailed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Makes sure the compiler executable exists, building it from its C++
/// source when it does not.
///
/// Runs once before the server accepts traffic. A failure is logged and
/// returned as a status rather than an error so the service still starts;
/// compile requests will then fail at launch.
pub async fn prepare(config: &ToolchainConfig) -> ToolchainStatus {
    if config.executable.is_file() {
        log::info!("Compiler found at {}", config.executable.display());
        return ToolchainStatus::Present;
    }

    if !config.source.is_file() {
        let reason = format!(
            "compiler {} not found and no source at {}",
            config.executable.display(),
            config.source.display()
        );
        log::error!("{}", reason);
        return ToolchainStatus::Missing(reason);
    }

    log::info!(
        "Building compiler: {} {} -o {}",
        config.cxx,
        config.source.display(),
        config.executable.display()
    );

    let args = [
        config.source.as_os_str(),
        OsStr::new("-o"),
        config.executable.as_os_str(),
    ];

    match runner::run(Path::new(&config.cxx), &args, config.build_timeout).await {
        Ok(result) if result.succeeded() => {
            log::info!("Compiler built in {}ms", result.duration_ms);
            ToolchainStatus::Built
        }
        Ok(result) if result.timed_out => {
            let reason = format!("compiler build exceeded {:?}", config.build_timeout);
            log::error!("{}", reason);
            ToolchainStatus::BuildFailed(reason)
        }
        Ok(result) => {
            let reason = format!(
                "compiler build exited with {:?}:\n{}",
                result.exit_code, result.stderr
            );
            log::error!("{}", reason);
            ToolchainStatus::BuildFailed(reason)
        }
        Err(e) => {
            let reason = format!("compiler build could not start: {}", e);
            log::error!("{}", reason);
            ToolchainStatus::BuildFailed(reason)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn toolchain(dir: &std::path::Path, cxx: &str) -> ToolchainConfig {
        ToolchainConfig {
            executable: dir.join("compiler"),
            source: dir.join("main.cpp"),
            cxx: cxx.to_string(),
            build_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_existing_executable_is_present() {
        let dir = tempfile::tempdir().unwrap();
        let config = toolchain(dir.path(), "g++");
        std::fs::write(&config.executable, b"").unwrap();

        assert_eq!(prepare(&config).await, ToolchainStatus::Present);
    }

    #[tokio::test]
    async fn test_missing_source_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let status = prepare(&toolchain(dir.path(), "g++")).await;

        assert!(!status.is_ready());
        assert!(matches!(status, ToolchainStatus::Missing(_)));
        assert!(status.failure().unwrap().contains("main.cpp"));
    }

    #[tokio::test]
    async fn test_failed_build_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let config = toolchain(dir.path(), "/bin/sh");
        std::fs::write(&config.source, "echo 'main.cpp:1: error' >&2; exit 1\n").unwrap();

        let status = prepare(&config).await;
        assert!(matches!(status, ToolchainStatus::BuildFailed(_)));
        assert!(status.failure().unwrap().contains("main.cpp:1: error"));
    }

    #[tokio::test]
    async fn test_unlaunchable_build_tool_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let config = toolchain(dir.path(), "/nonexistent/g++");
        std::fs::write(&config.source, b"int main() {}").unwrap();

        let status = prepare(&config).await;
        assert!(status.failure().unwrap().contains("could not start"));
    }

    #[tokio::test]
    async fn test_successful_build_is_built() {
        // sh runs the "source" as a script with `-o <exe>` as its arguments
        let dir = tempfile::tempdir().unwrap();
        let config = toolchain(dir.path(), "/bin/sh");
        std::fs::write(&config.source, "touch \"$2\"\n").unwrap();

        assert_eq!(prepare(&config).await, ToolchainStatus::Built);
        assert!(config.executable.is_file());
    }
}
