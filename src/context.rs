use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Why a store or cache call was aborted before it completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("operation cancelled")]
    Cancelled,
}

/// Execution context handed to every store and cache call.
///
/// Carries an optional deadline and an optional cancellation signal. Cloning is
/// cheap and clones observe the same cancellation.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels every [`RequestContext`] derived from the call that created it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl RequestContext {
    /// A context that never expires and cannot be cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: None,
        }
    }

    /// Attach a cancellation signal, keeping the current deadline.
    pub fn cancellable(self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            deadline: self.deadline,
            cancel: Some(rx),
        };
        (ctx, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Synchronous probe for adapters: call before mutating anything.
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Err(Interrupted::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Interrupted::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `fut` to completion unless the deadline passes or the context is
    /// cancelled first, in which case `fut` is dropped.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        self.check()?;

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancelled() => Err(Interrupted::Cancelled),
            () = expired => Err(Interrupted::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }

    async fn cancelled(&self) {
        let Some(rx) = &self.cancel else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        // A dropped handle can never cancel.
        let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}
