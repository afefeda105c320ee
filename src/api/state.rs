// src/api/state.rs
use crate::config::AppConfig;
use crate::errors::Result;
use crate::toolchain::ToolchainStatus;
use crate::workspace::WorkspaceManager;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub workspaces: WorkspaceManager,
    pub toolchain: Arc<ToolchainStatus>,
    /// Bounds how many compiler processes run at once
    pub run_slots: Arc<Semaphore>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, toolchain: ToolchainStatus) -> Result<Self> {
        let workspaces = WorkspaceManager::new(config.workspace_root.clone())?;
        let run_slots = Arc::new(Semaphore::new(config.max_concurrent_runs));

        Ok(Self {
            config: Arc::new(config),
            workspaces,
            toolchain: Arc::new(toolchain),
            run_slots,
            started_at: Utc::now(),
        })
    }
}
