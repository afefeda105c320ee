// src/compiler.rs
use crate::api::AppState;
use crate::classifier::classify;
use crate::errors::{Result, ServiceError};
use crate::models::ClassifiedResponse;
use crate::runner::{self, ExecutionResult};
use crate::workspace::Workspace;
use std::time::Duration;
use tokio::time::Instant;

/// Handles one compile request end to end.
///
/// Never fails: every error is folded into the returned response, and the
/// request's workspace is gone by the time this returns.
pub async fn compile_source(state: &AppState, code: &str) -> ClassifiedResponse {
    let outcome = execute(state, code).await;

    match &outcome {
        Ok(result) => log::info!(
            "Compiler finished: exit={:?} timed_out={} {}ms",
            result.exit_code,
            result.timed_out,
            result.duration_ms
        ),
        Err(ServiceError::EmptyCode) => log::info!("Rejected empty submission"),
        Err(e) => log::error!("Compile request failed: {}", e),
    }

    classify(&outcome, &state.toolchain)
}

/// Validates `code`, runs the compiler on it in a fresh workspace and
/// returns the raw execution result.
pub async fn execute(state: &AppState, code: &str) -> Result<ExecutionResult> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ServiceError::EmptyCode);
    }

    // Waiting for a slot is charged to the same budget as the run itself.
    let budget = state.config.exec_timeout;
    let deadline = Instant::now() + budget;

    let _slot = match tokio::time::timeout_at(deadline, state.run_slots.acquire()).await {
        Ok(permit) => permit.map_err(|e| ServiceError::Io(std::io::Error::other(e)))?,
        Err(_) => return Err(ServiceError::Busy(budget)),
    };

    let mut workspace = state.workspaces.create().await?;
    log::debug!("Request {} running in {}", workspace.id(), workspace.dir().display());

    let remaining = deadline.saturating_duration_since(Instant::now());
    let result = run_in(state, &workspace, code, remaining).await;
    workspace.destroy();
    result
}

async fn run_in(
    state: &AppState,
    workspace: &Workspace,
    code: &str,
    timeout: Duration,
) -> Result<ExecutionResult> {
    workspace.write_input(code).await?;

    runner::run(
        &state.config.toolchain.executable,
        &[workspace.input_path()],
        timeout,
    )
    .await
}
