//! Types shared by code execution backends and their callers.
//!
//! A backend stages submitted source text, runs it in a separate interpreter
//! process under a wall-clock deadline, and hands back the captured streams.
//! The process boundary is a resource and crash isolation boundary only. It
//! is not a security sandbox: submitted code keeps whatever filesystem and
//! network access the host interpreter has.

mod config;
mod error;
mod language;
mod sandbox;
mod types;

pub use config::{
    DEFAULT_MAX_CODE_BYTES, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT, SandboxConfig,
};
pub use error::{Result, SandboxError};
pub use language::Language;
pub use sandbox::Sandbox;
pub use types::{ExecRequest, ExecResult, timeout_message};
