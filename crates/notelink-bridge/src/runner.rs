//! External command execution
//!
//! Every bridge call goes through [`CommandRunner`] so the device bridge can be
//! exercised without spawning real processes.

use std::fmt;
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use notelink_core::prelude::*;
use tokio::process::Command;
use tokio::time::timeout;

/// One external invocation: program, arguments and its time ceiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    /// Whether the arguments begin with `prefix`
    pub fn args_start_with(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len() && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// stderr if present, otherwise stdout, trimmed
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Runs external commands to completion or timeout.
///
/// Implementations must map a missing executable to [`Error::BridgeNotFound`]
/// and an exceeded ceiling to [`Error::CommandTimeout`]. They never retry.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> impl Future<Output = Result<CommandOutput>>;
}

/// Real process runner backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!("Running: {}", spec);

        let child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = timeout(spec.timeout, child)
            .await
            .map_err(|_| Error::command_timeout(spec.to_string(), spec.timeout))?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::bridge_not_found(&spec.program)
                } else {
                    Error::Io(e)
                }
            })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        trace!("{} exited with {:?}", spec.program, result.code);
        if !result.stderr.is_empty() {
            debug!("{} stderr: {}", spec.program, result.stderr.trim());
        }

        Ok(result)
    }
}
