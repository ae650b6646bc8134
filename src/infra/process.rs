//! Subprocess invocation
//!
//! One operating-system process per call: the payload is written to stdin
//! while stdout and stderr are drained, then stdin is closed to signal
//! end-of-input. `kill_on_drop` releases the child on every exit path.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};

use super::command::CommandInvocation;
use crate::error::InvokeError;

/// Exit code recorded when the process was terminated by a signal
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    /// Classify the exit code according to the invocation mode
    pub fn check(self, command: &CommandInvocation) -> Result<Self, InvokeError> {
        if command.mode.accepts(self.exit_code) {
            Ok(self)
        } else {
            Err(InvokeError::Exit {
                command: command.display(),
                code: self.exit_code,
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs one external command to completion
#[async_trait]
pub trait ProcessInvoker: Send + Sync {
    async fn invoke(
        &self,
        command: &CommandInvocation,
        stdin: Vec<u8>,
    ) -> Result<ProcessOutcome, InvokeError>;
}

/// Spawns real processes through tokio
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessInvoker;

#[async_trait]
impl ProcessInvoker for TokioProcessInvoker {
    async fn invoke(
        &self,
        command: &CommandInvocation,
        stdin: Vec<u8>,
    ) -> Result<ProcessOutcome, InvokeError> {
        let rendered = command.display();
        tracing::debug!("Running {} command: {}", command.mode, rendered);

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| InvokeError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        let pipe = child.stdin.take().ok_or_else(|| InvokeError::Io {
            command: rendered.clone(),
            source: io::Error::other("stdin was not captured"),
        })?;

        let (written, output) = tokio::join!(write_stdin(pipe, &stdin), child.wait_with_output());

        let output = output.map_err(|source| InvokeError::Io {
            command: rendered.clone(),
            source,
        })?;

        match written {
            Ok(()) => {}
            // The tool may exit without consuming all of its input
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::trace!("{} closed stdin early", rendered);
            }
            Err(source) => {
                return Err(InvokeError::Io {
                    command: rendered,
                    source,
                });
            }
        }

        let outcome = ProcessOutcome {
            exit_code: output.status.code().unwrap_or(SIGNAL_EXIT_CODE),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            "{} exited with code {} ({} bytes stdout, {} bytes stderr)",
            rendered,
            outcome.exit_code,
            outcome.stdout.len(),
            outcome.stderr.len()
        );

        Ok(outcome)
    }
}

async fn write_stdin(mut pipe: ChildStdin, payload: &[u8]) -> io::Result<()> {
    pipe.write_all(payload).await?;
    pipe.shutdown().await
}
