//! Infrastructure layer for godot-formatter
//!
//! Command construction, subprocess invocation and output decoding.

pub mod command;
pub mod decoder;
pub mod log;
pub mod process;

pub use command::{CommandBuilder, CommandInvocation, Mode};
pub use log::LogSink;
pub use process::{ProcessInvoker, ProcessOutcome, TokioProcessInvoker};
