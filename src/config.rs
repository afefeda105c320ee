// src/config.rs
use crate::errors::{Result, ServiceError};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_CONCURRENT_RUNS: usize = 8;

/// Where the compiler lives and how to build it when it is missing.
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    /// Executable invoked as `<executable> <input-file>`
    pub executable: PathBuf,
    /// C++ source the executable is built from at startup
    pub source: PathBuf,
    /// C++ compiler used for the startup build
    pub cxx: String,
    pub build_timeout: Duration,
}

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub toolchain: ToolchainConfig,
    /// Wall-clock budget for a single compiler run
    pub exec_timeout: Duration,
    pub max_concurrent_runs: usize,
    pub workspace_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            toolchain: ToolchainConfig {
                executable: PathBuf::from("./compiler"),
                source: PathBuf::from("main.cpp"),
                cxx: "g++".to_string(),
                build_timeout: Duration::from_secs(DEFAULT_BUILD_TIMEOUT_SECS),
            },
            exec_timeout: Duration::from_secs(DEFAULT_EXEC_TIMEOUT_SECS),
            max_concurrent_runs: DEFAULT_MAX_CONCURRENT_RUNS,
            workspace_root: std::env::temp_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to
    /// the defaults for anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let exec_timeout = parse_var(&lookup, "EXEC_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.exec_timeout);
        let build_timeout = parse_var(&lookup, "BUILD_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.toolchain.build_timeout);
        let max_concurrent_runs: usize =
            parse_var(&lookup, "MAX_CONCURRENT_RUNS")?.unwrap_or(defaults.max_concurrent_runs);

        if exec_timeout.is_zero() {
            return Err(ServiceError::Config(
                "EXEC_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if max_concurrent_runs == 0 {
            return Err(ServiceError::Config(
                "MAX_CONCURRENT_RUNS must be greater than zero".to_string(),
            ));
        }

        Ok(AppConfig {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port,
            toolchain: ToolchainConfig {
                executable: lookup("COMPILER_EXE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.toolchain.executable),
                source: lookup("COMPILER_SOURCE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.toolchain.source),
                cxx: lookup("CXX").unwrap_or(defaults.toolchain.cxx),
                build_timeout,
            },
            exec_timeout,
            max_concurrent_runs,
            workspace_root: lookup("WORKSPACE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_root),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ServiceError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.exec_timeout, Duration::from_secs(10));
        assert_eq!(config.toolchain.executable, PathBuf::from("./compiler"));
        assert_eq!(config.toolchain.source, PathBuf::from("main.cpp"));
        assert_eq!(config.toolchain.cxx, "g++");
        assert_eq!(config.max_concurrent_runs, 8);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "8088"),
            ("EXEC_TIMEOUT_SECS", "3"),
            ("COMPILER_EXE", "/opt/mukku/compiler"),
            ("MAX_CONCURRENT_RUNS", "2"),
            ("WORKSPACE_ROOT", "/var/tmp/mukku"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8088);
        assert_eq!(config.exec_timeout, Duration::from_secs(3));
        assert_eq!(config.toolchain.executable, PathBuf::from("/opt/mukku/compiler"));
        assert_eq!(config.max_concurrent_runs, 2);
        assert_eq!(config.workspace_root, PathBuf::from("/var/tmp/mukku"));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ServiceError::Config(ref msg) if msg.contains("PORT")));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("EXEC_TIMEOUT_SECS", "0")]));
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }
}
