use super::{Converter, ToolDiag, ToolOutcome};
use crate::{config::Config, plan::ConversionJob};
use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub struct ExternalTool {
    tool: PathBuf,
    timeout_seconds: u64,
    capture_stderr: bool,
}

impl ExternalTool {
    pub fn new(cfg: &Config) -> Self {
        Self {
            tool: PathBuf::from(&cfg.paths.tool),
            timeout_seconds: cfg.tool.timeout_seconds,
            capture_stderr: cfg.tool.capture_stderr,
        }
    }

    pub fn with_tool_path(cfg: &Config, tool: PathBuf) -> Self {
        Self {
            tool,
            timeout_seconds: cfg.tool.timeout_seconds,
            capture_stderr: cfg.tool.capture_stderr,
        }
    }
}

impl Converter for ExternalTool {
    fn doctor(&self) -> Result<ToolDiag> {
        let meta = std::fs::metadata(&self.tool).ok();
        let exists = meta.is_some();
        let is_file = meta.as_ref().map(|m| m.is_file()).unwrap_or(false);
        let executable = executable_bit(meta.as_ref());

        Ok(ToolDiag {
            tool: self.tool.display().to_string(),
            exists,
            is_file,
            executable,
            ok: is_file && executable.unwrap_or(true),
        })
    }

    fn convert(&self, job: &ConversionJob) -> ToolOutcome {
        debug!(
            "spawn {} {} {}",
            self.tool.display(),
            job.input.display(),
            job.output.display()
        );

        let mut cmd = Command::new(&self.tool);
        cmd.arg(&job.input);
        cmd.arg(&job.output);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return ToolOutcome::LaunchFailed {
                    error: format!("{}: {}", self.tool.display(), err),
                };
            }
        };

        let output = if self.timeout_seconds > 0 {
            let timeout = Duration::from_secs(self.timeout_seconds);
            match wait_with_timeout(&mut child, timeout) {
                Ok(out) => out,
                Err(WaitError::TimedOut) => {
                    return ToolOutcome::TimedOut {
                        seconds: self.timeout_seconds,
                    };
                }
                Err(WaitError::Other(err)) => {
                    return ToolOutcome::LaunchFailed {
                        error: format!("{:#}", err),
                    };
                }
            }
        } else {
            match child.wait_with_output() {
                Ok(out) => out,
                Err(err) => {
                    return ToolOutcome::LaunchFailed {
                        error: format!("waiting for tool: {}", err),
                    };
                }
            }
        };

        if output.status.success() {
            return ToolOutcome::Completed;
        }

        let stderr = if self.capture_stderr {
            String::from_utf8_lossy(&output.stderr).trim().to_string()
        } else {
            String::new()
        };
        ToolOutcome::ExitedNonZero {
            code: output.status.code(),
            stderr,
        }
    }
}

#[cfg(unix)]
fn executable_bit(meta: Option<&std::fs::Metadata>) -> Option<bool> {
    use std::os::unix::fs::PermissionsExt;
    meta.map(|m| m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn executable_bit(_meta: Option<&std::fs::Metadata>) -> Option<bool> {
    None
}

enum WaitError {
    TimedOut,
    Other(anyhow::Error),
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output, WaitError> {
    // Drain pipes while waiting so a chatty tool can't deadlock on a full
    // stdout/stderr buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf).with_context(|| "read stdout")?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf).with_context(|| "read stderr")?;
        }
        Ok(buf)
    });

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stdout = join_reader(stdout_thread).map_err(WaitError::Other)?;
                let stderr = join_reader(stderr_thread).map_err(WaitError::Other)?;
                return Ok(Output {
                    status,
                    stdout,
                    stderr,
                });
            }
            Ok(None) => {}
            Err(err) => {
                return Err(WaitError::Other(
                    anyhow::Error::new(err).context("try_wait"),
                ));
            }
        }

        if start.elapsed() > timeout {
            warn!("tool process timed out after {:?}", timeout);
            let _ = child.kill();
            let _ = child.wait();
            let _ = join_reader(stdout_thread);
            let _ = join_reader(stderr_thread);
            return Err(WaitError::TimedOut);
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}

fn join_reader(handle: std::thread::JoinHandle<Result<Vec<u8>>>) -> Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| anyhow!("pipe reader thread panicked"))?
}
