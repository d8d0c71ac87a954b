//! Bounded shell execution.
//!
//! Every entry point returns an [`ExecResult`] and never an error: spawn
//! failures, non-zero exits and timeouts all surface as `success = false`
//! with diagnostic text.

mod policy;

pub use policy::AutoExecPolicy;

use crate::classifier::HotCommand;
use serde::Serialize;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default execution budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Trailing marker that sends a command to the background.
pub const BACKGROUND_MARKER: &str = "&";

/// How long output is still collected after the shell has exited.
pub const OUTPUT_GRACE: Duration = Duration::from_millis(100);

/// Outcome of running a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    pub success: bool,
    pub output: String,
}

impl ExecResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self { success: true, output: output.into() }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self { success: false, output: output.into() }
    }
}

/// True if the trimmed command ends with the background marker (and is
/// not a `&&` chain cut short).
pub fn is_background(command: &str) -> bool {
    let trimmed = command.trim_end();
    trimmed.ends_with(BACKGROUND_MARKER) && !trimmed.ends_with("&&")
}

/// Drains one child pipe in the background into a shared buffer.
struct PipeCollector {
    buffer: Arc<Mutex<Vec<u8>>>,
    reader: Option<JoinHandle<()>>,
}

impl PipeCollector {
    fn start<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let reader = pipe.map(|mut pipe| {
            let buffer = buffer.clone();
            tokio::spawn(async move {
                let mut chunk = [0u8; 4096];
                loop {
                    match pipe.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buffer.lock().await.extend_from_slice(&chunk[..n]),
                    }
                }
            })
        });
        Self { buffer, reader }
    }

    /// Wait briefly for end of output, then return what arrived, trimmed.
    async fn finish(mut self) -> String {
        if let Some(reader) = self.reader.as_mut() {
            if tokio::time::timeout(OUTPUT_GRACE, &mut *reader).await.is_err() {
                debug!("Output pipe still open after exit; keeping partial output");
            }
        }
        let bytes = self.buffer.lock().await;
        String::from_utf8_lossy(&bytes).trim().to_string()
    }
}

impl Drop for PipeCollector {
    fn drop(&mut self) {
        if let Some(reader) = &self.reader {
            reader.abort();
        }
    }
}

/// Runs commands through a system shell.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
    timeout: Duration,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ShellExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            shell: "sh".to_string(),
            timeout,
        }
    }

    /// Use a different shell binary (invoked as `<shell> -c <command>`).
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Run `command` with the configured timeout, detaching it when it ends
    /// with the background marker.
    pub async fn run(&self, command: &str) -> ExecResult {
        if is_background(command) {
            self.spawn_detached(command)
        } else {
            self.execute(command, self.timeout).await
        }
    }

    /// Run `command` and wait up to `timeout` for the shell to exit.
    ///
    /// Exit status zero yields trimmed stdout; anything else yields trimmed
    /// stderr. Only the shell's own exit is awaited: output still held open
    /// by a child it left running is collected for [`OUTPUT_GRACE`] and then
    /// abandoned. The shell is killed when the timeout expires.
    pub async fn execute(&self, command: &str, timeout: Duration) -> ExecResult {
        debug!("Executing via {}: {}", self.shell, command);

        let spawned = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn {}: {}", self.shell, e);
                return ExecResult::failed(e.to_string());
            }
        };

        let stdout = PipeCollector::start(child.stdout.take());
        let stderr = PipeCollector::start(child.stderr.take());

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) if status.success() => ExecResult::ok(stdout.finish().await),
            Ok(Ok(status)) => {
                debug!("Command exited with {}", status);
                ExecResult::failed(stderr.finish().await)
            }
            Ok(Err(e)) => {
                warn!("Failed to wait for {}: {}", self.shell, e);
                ExecResult::failed(e.to_string())
            }
            Err(_) => {
                warn!("Command timed out after {:?}: {}", timeout, command);
                if let Err(e) = child.kill().await {
                    debug!("Failed to kill timed out command: {}", e);
                }
                ExecResult::failed(format!("Command timed out after {:?}", timeout))
            }
        }
    }

    /// Start `command` without waiting for it. Output goes to /dev/null.
    pub fn spawn_detached(&self, command: &str) -> ExecResult {
        let spawned = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                info!("Started background command (pid {:?}): {}", child.id(), command);
                ExecResult::ok(format!("Started: {}", command.trim()))
            }
            Err(e) => {
                warn!("Failed to start background command: {}", e);
                ExecResult::failed(e.to_string())
            }
        }
    }

    /// Run a hot command's script with `parameter` as its last argument.
    ///
    /// The script shares the caller's terminal and is not time-bounded.
    pub async fn invoke_script(&self, hot: &HotCommand, parameter: &str) -> ExecResult {
        let mut cmd = Command::new(&hot.program);
        cmd.args(&hot.args);
        if !parameter.is_empty() {
            cmd.arg(parameter);
        }

        info!("Invoking {} ({} {:?} {})", hot.script_id, hot.program, hot.args, parameter);
        match cmd.status().await {
            Ok(status) if status.success() => {
                ExecResult::ok(format!("{} finished for '{}'", hot.script_id, parameter))
            }
            Ok(status) => ExecResult::failed(format!("{} exited with {}", hot.script_id, status)),
            Err(e) => {
                warn!("Failed to invoke {}: {}", hot.program, e);
                ExecResult::failed(format!("Failed to invoke {}: {}", hot.program, e))
            }
        }
    }
}
