// src/classifier.rs
use crate::errors::ServiceError;
use crate::models::ClassifiedResponse;
use crate::runner::ExecutionResult;
use crate::toolchain::ToolchainStatus;

pub const EMPTY_CODE_MESSAGE: &str = "Empty code submitted";
pub const TIMEOUT_MESSAGE: &str = "Timeout: execution exceeded the limit";

/// Maps the outcome of a compile request onto the response the client sees.
///
/// Checked in order: empty input, timeout, nonzero exit, clean exit, and
/// finally any system failure. `toolchain` is consulted only when the
/// compiler could not be launched, to explain why.
pub fn classify(
    outcome: &Result<ExecutionResult, ServiceError>,
    toolchain: &ToolchainStatus,
) -> ClassifiedResponse {
    match outcome {
        Err(ServiceError::EmptyCode) => ClassifiedResponse::client_error(EMPTY_CODE_MESSAGE),
        Ok(result) if result.timed_out => ClassifiedResponse::client_error(TIMEOUT_MESSAGE),
        Ok(result) if result.exit_code != Some(0) => {
            let code = result
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            ClassifiedResponse::client_error(format!(
                "Runtime Error (Code {}):\n{}",
                code, result.stderr
            ))
        }
        Ok(result) => ClassifiedResponse::success(result.stdout.clone()),
        Err(e @ ServiceError::Launch { .. }) => match toolchain.failure() {
            Some(reason) => {
                ClassifiedResponse::server_error(format!("Server Error: {} ({})", e, reason))
            }
            None => ClassifiedResponse::server_error(format!("Server Error: {}", e)),
        },
        Err(e) => ClassifiedResponse::server_error(format!("Server Error: {}", e)),
    }
}
