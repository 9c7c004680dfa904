//! Asynchronous driver execution.
//!
//! Resolution happens synchronously on the caller's thread; only the driver
//! invocation itself is handed to the executor. The FFI call runs under
//! `spawn_blocking` so it never stalls the async runtime, and the
//! [`ResolvedEntryPoint`] is moved into the task, which means its isolation
//! boundary (library plus staged files) is released when the task finishes.
//!
//! # Module Structure
//!
//! - `args` - shell-like splitting of driver argument strings
//! - `ffi` - entry symbol contract and driver invocation
//! - `handle` - cancellable job handles

mod args;
pub(crate) mod ffi;
mod handle;

pub use args::split_args;
pub use ffi::{ENTRY_SYMBOL, EntryFn};
pub use handle::{CancelFlag, JobHandle, WaitOutcome};

use crate::boundary::ResolvedEntryPoint;
use crate::error::{Error, Result};

/// Submit a resolved entry point for execution.
///
/// The argument string is split on the calling thread; splitting failures
/// surface here rather than through the handle. Returns immediately.
pub fn submit(
    runtime: &tokio::runtime::Handle,
    resolved: ResolvedEntryPoint,
    args: &str,
) -> Result<JobHandle> {
    let argv = split_args(args)?;
    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    let unit = resolved.name().clone();

    let join = runtime.spawn(async move {
        if flag.is_cancelled() {
            tracing::debug!(unit = %unit, "job cancelled before start");
            return Err(Error::Aborted);
        }
        tracing::info!(unit = %unit, "invoking driver");
        tokio::task::spawn_blocking(move || resolved.invoke(&argv))
            .await
            .map_err(|e| {
                if e.is_cancelled() {
                    Error::Aborted
                } else {
                    Error::Execution(format!("driver task panicked: {e}"))
                }
            })?
    });

    Ok(JobHandle { join, cancel })
}
