// src/runner.rs
use crate::errors::{Result, ServiceError};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Captured outcome of one external process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed for exceeding its budget.
    /// A process terminated by a signal reports the negated signal number.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Output still unread this long after the process group is gone is given
/// up on.
const PIPE_GRACE: Duration = Duration::from_secs(2);

/// Runs `program` with `args`, capturing both output streams.
///
/// On unix the child leads its own process group, and the whole group is
/// killed with SIGKILL once the child exits or `timeout` elapses, so nothing
/// the program started can outlive the run. The future resolves only after
/// the child has exited or been killed; output is not streamed. Failing to
/// start the program is reported as [`ServiceError::Launch`], while a program
/// that starts and exits nonzero is a normal `Ok` result.
pub async fn run<S>(program: &Path, args: &[S], timeout: Duration) -> Result<ExecutionResult>
where
    S: AsRef<OsStr>,
{
    let program_name = program.display().to_string();
    let start = Instant::now();

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|source| ServiceError::Launch {
        program: program_name.clone(),
        source,
    })?;
    let mut group = ProcessGroup::new(child.id());

    log::debug!("Spawned '{}' (pid {:?})", program_name, child.id());

    // Both pipes are drained while waiting so a chatty child cannot block on
    // a full pipe buffer.
    let stdout = tokio::spawn(drain(child.stdout.take()));
    let stderr = tokio::spawn(drain(child.stderr.take()));

    let waited = tokio::time::timeout(timeout, child.wait()).await;

    // Leftover descendants would keep running and hold the pipes open.
    group.kill();

    let status = match waited {
        Ok(Ok(status)) => Some(status),
        Ok(Err(source)) => {
            return Err(ServiceError::Process {
                program: program_name,
                source,
            });
        }
        Err(_) => {
            if let Err(e) = child.kill().await {
                log::warn!("Failed to kill '{}' after timeout: {}", program_name, e);
            }
            None
        }
    };

    let pipes = tokio::time::timeout(
        PIPE_GRACE,
        futures::future::try_join(collect(stdout), collect(stderr)),
    )
    .await;
    let duration_ms = start.elapsed().as_millis() as u64;

    let (stdout, stderr) = match (pipes, status) {
        (Ok(Ok(output)), _) => output,
        (_, None) => (Vec::new(), Vec::new()),
        (Ok(Err(source)), Some(_)) => {
            return Err(ServiceError::Process {
                program: program_name,
                source,
            });
        }
        (Err(_), Some(_)) => {
            return Err(ServiceError::Process {
                program: program_name,
                source: std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "output pipes stayed open after exit",
                ),
            });
        }
    };

    let Some(status) = status else {
        log::warn!(
            "'{}' exceeded its {:?} budget and was killed after {}ms",
            program_name,
            timeout,
            duration_ms
        );
        return Ok(ExecutionResult {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: None,
            timed_out: true,
            duration_ms,
        });
    };

    let exit_code = exit_code(status);
    log::debug!(
        "'{}' exited with {:?} after {}ms",
        program_name,
        exit_code,
        duration_ms
    );

    Ok(ExecutionResult {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code,
        timed_out: false,
        duration_ms,
    })
}

/// The process group a spawned child leads. Dropping it kills the group,
/// which covers a caller that abandons [`run`] midway.
struct ProcessGroup {
    pgid: Option<u32>,
}

impl ProcessGroup {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn kill(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };

        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            match killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => log::warn!("Failed to kill process group {}: {}", pgid, e),
            }
        }
        #[cfg(not(unix))]
        let _ = pgid;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

async fn collect(reader: JoinHandle<std::io::Result<Vec<u8>>>) -> std::io::Result<Vec<u8>> {
    reader.await.map_err(std::io::Error::other)?
}

async fn drain<R>(pipe: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

fn exit_code(status: ExitStatus) -> Option<i32> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(-signal);
        }
    }
    status.code()
}
