use async_trait::async_trait;

use crate::types::{ExecRequest, ExecResult};

/// A backend that runs one submission per call.
///
/// Implementations must be stateless between calls so a single instance can
/// be shared (e.g. behind `Arc`) by concurrent callers.
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Human-readable backend name (e.g. "process").
    fn name(&self) -> &str;

    /// Run `request.code` to completion or until the deadline.
    ///
    /// Never fails: every error is folded into `ExecResult::stderr`.
    async fn execute(&self, request: &ExecRequest<'_>) -> ExecResult;
}
