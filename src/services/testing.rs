//! Scripted process invoker for pipeline tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::InvokeError;
use crate::infra::command::CommandInvocation;
use crate::infra::process::{ProcessInvoker, ProcessOutcome};

pub(crate) enum Reply {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
        delay: Duration,
    },
    SpawnFailure,
}

impl Reply {
    pub(crate) fn ok(stdout: &str) -> Self {
        Self::exit(0, stdout, "")
    }

    pub(crate) fn exit(code: i32, stdout: &str, stderr: &str) -> Self {
        Self::Exit {
            code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn delayed(self, by: Duration) -> Self {
        match self {
            Self::Exit {
                code,
                stdout,
                stderr,
                ..
            } => Self::Exit {
                code,
                stdout,
                stderr,
                delay: by,
            },
            other => other,
        }
    }
}

/// Replies in order and records every call
#[derive(Default)]
pub(crate) struct ScriptedInvoker {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(CommandInvocation, Vec<u8>)>>,
}

impl ScriptedInvoker {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(CommandInvocation, Vec<u8>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        command: &CommandInvocation,
        stdin: Vec<u8>,
    ) -> Result<ProcessOutcome, InvokeError> {
        self.calls.lock().unwrap().push((command.clone(), stdin));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted reply left");

        match reply {
            Reply::Exit {
                code,
                stdout,
                stderr,
                delay,
            } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(ProcessOutcome {
                    exit_code: code,
                    stdout,
                    stderr,
                })
            }
            Reply::SpawnFailure => Err(InvokeError::Spawn {
                command: command.display(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
            }),
        }
    }
}
