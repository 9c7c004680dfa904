//! Asynchronous job handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};

use crate::error::{Error, Result};

/// Shared cancellation flag for a submitted job.
///
/// Cloned into the spawned task, which checks it before invoking the driver.
/// Cancellation is cooperative: a driver that already started is not
/// forcibly stopped.
#[derive(Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Outcome of [`JobHandle::wait_timeout`].
pub enum WaitOutcome {
    /// The job finished within the timeout.
    Finished(Result<()>),
    /// The timeout elapsed; the handle is given back for further waiting
    /// or cancellation.
    TimedOut(JobHandle),
}

/// Asynchronous, cancellable reference to a submitted driver invocation.
///
/// Failures inside the driver are captured by the task and delivered here,
/// never on the submitting thread.
pub struct JobHandle {
    pub(super) join: JoinHandle<Result<()>>,
    pub(super) cancel: CancelFlag,
}

impl JobHandle {
    /// Non-blocking completion check.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Request best-effort cancellation.
    ///
    /// Prevents invocation when the task has not started yet; aborts the
    /// task otherwise. A driver already inside its entry point keeps running
    /// until it returns. Cancelling a finished job is a no-op.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.join.abort();
    }

    /// Wait for the job to finish and return its outcome.
    pub async fn wait(self) -> Result<()> {
        flatten(self.join.await)
    }

    /// Wait for the job with a timeout.
    pub async fn wait_timeout(mut self, timeout: Duration) -> WaitOutcome {
        match tokio::time::timeout(timeout, &mut self.join).await {
            Ok(joined) => WaitOutcome::Finished(flatten(joined)),
            Err(_) => WaitOutcome::TimedOut(self),
        }
    }
}

fn flatten(joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(outcome) => outcome,
        Err(e) if e.is_cancelled() => Err(Error::Aborted),
        Err(e) => Err(Error::Execution(format!("driver task panicked: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_shared_across_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());

        clone.cancel();
        assert!(flag.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_flatten_maps_cancellation_to_aborted() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let join = runtime.spawn(async { Ok(()) });
        join.abort();
        let outcome = runtime.block_on(async { flatten(join.await) });
        assert!(matches!(outcome, Err(Error::Aborted)));
    }
}
