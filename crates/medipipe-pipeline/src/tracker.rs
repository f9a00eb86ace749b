//! Stage completion flags.
//!
//! A [`StageFlag`] is a set-once boolean that tasks can await. The
//! orchestrator raises each stage's flag after joining that stage's
//! worker pool, so by the time a flag reads done, every worker of the
//! stage has already exited and every item the stage produced has been
//! handed downstream.

use tokio::sync::watch;

/// Monotonic one-way flag: starts unset, can only move to done.
pub struct StageFlag {
    tx: watch::Sender<bool>,
}

impl StageFlag {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Raise the flag. Returns `false` if it was already raised.
    pub fn mark_done(&self) -> bool {
        self.tx.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        })
    }

    pub fn is_done(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the flag is raised. Returns immediately if it already is.
    pub async fn wait_done(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so wait_for cannot observe a closed
        // channel here.
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl Default for StageFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// The two per-run stage flags, raised in pipeline order.
#[derive(Default)]
pub struct CompletionTracker {
    pub transcode: StageFlag,
    pub upload: StageFlag,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flag_is_set_once() {
        let flag = StageFlag::new();
        assert!(!flag.is_done());
        assert!(flag.mark_done());
        assert!(flag.is_done());
        // A second raise is a no-op.
        assert!(!flag.mark_done());
        assert!(flag.is_done());
    }

    #[tokio::test]
    async fn wait_done_wakes_waiters() {
        let flag = std::sync::Arc::new(StageFlag::new());
        let waiter = {
            let flag = std::sync::Arc::clone(&flag);
            tokio::spawn(async move {
                flag.wait_done().await;
                flag.is_done()
            })
        };
        tokio::task::yield_now().await;
        flag.mark_done();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn wait_done_returns_immediately_when_already_done() {
        let flag = StageFlag::new();
        flag.mark_done();
        flag.wait_done().await;
    }
}
