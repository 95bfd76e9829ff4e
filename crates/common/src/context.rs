//! Request-scoped cancellation and deadline propagation.
//!
//! A [`RequestContext`] is created once for each inbound request and handed
//! by reference to every downstream call made on its behalf. Cloning a
//! context is cheap and every clone observes the same cancellation signal.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a context-bound call did not run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// The request deadline passed before the call finished.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation signal and optional deadline for one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    cancelled: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

/// Owner side of a [`RequestContext`]'s cancellation signal.
///
/// Dropping the handle without calling [`CancelHandle::cancel`] leaves the
/// context un-cancelled.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancels every clone of the associated context.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl RequestContext {
    /// Creates a cancellable context without a deadline.
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancelled: rx,
                deadline: None,
            },
            CancelHandle { tx },
        )
    }

    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        let (ctx, _handle) = Self::new();
        ctx
    }

    /// Returns a context that also expires at `deadline`.
    ///
    /// An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current <= deadline => current,
            _ => deadline,
        });
        self
    }

    /// Returns a context that also expires `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The deadline, if one was set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` means unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns true once the request has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Fails fast if the context is already cancelled or expired.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.is_cancelled() {
            return Err(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ContextError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drives `fut` until it completes, the context is cancelled, or the
    /// deadline passes, whichever happens first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        self.check()?;

        let mut cancelled = self.cancelled.clone();
        let cancellation = async move {
            loop {
                if *cancelled.borrow_and_update() {
                    return;
                }
                if cancelled.changed().await.is_err() {
                    // Sender gone without cancelling: this request can no longer be cancelled.
                    std::future::pending::<()>().await;
                }
            }
        };
        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancellation => Err(ContextError::Cancelled),
            () = expiry => Err(ContextError::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_context_runs_to_completion() {
        let ctx = RequestContext::background();
        let out = ctx.run(async { 42 }).await;
        assert_eq!(out, Ok(42));
        assert!(ctx.remaining().is_none());
    }

    #[tokio::test]
    async fn test_cancel_before_run_fails_fast() {
        let (ctx, handle) = RequestContext::new();
        handle.cancel();

        assert!(ctx.is_cancelled());
        let out = ctx.run(async { 1 }).await;
        assert_eq!(out, Err(ContextError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_call() {
        let (ctx, handle) = RequestContext::new();
        let clone = ctx.clone();

        let (out, ()) = tokio::join!(
            clone.run(std::future::pending::<()>()),
            async {
                tokio::task::yield_now().await;
                handle.cancel();
            }
        );

        assert_eq!(out, Err(ContextError::Cancelled));
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let (ctx, handle) = RequestContext::new();
        drop(handle);

        let out = ctx.run(async { "done" }).await;
        assert_eq!(out, Ok("done"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_slow_call() {
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(50));

        let out = ctx
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;

        assert_eq!(out, Err(ContextError::DeadlineExceeded));
        assert_eq!(ctx.check(), Err(ContextError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_deadline_is_kept() {
        let ctx = RequestContext::background()
            .with_timeout(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(10));

        let remaining = ctx.remaining().unwrap();
        assert!(remaining <= Duration::from_millis(10));
    }
}
