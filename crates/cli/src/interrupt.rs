//! Ctrl+C handling for batch commands
//!
//! A guard lives for the length of one batch. Ctrl+C cancels the batch token,
//! so no further transfers start; in-flight transfers run to completion.

use tokio::signal;
use tokio_util::sync::CancellationToken;

pub struct CtrlCGuard {
    batch: CancellationToken,
    released: CancellationToken,
}

impl CtrlCGuard {
    pub fn install() -> Self {
        let batch = CancellationToken::new();
        let released = CancellationToken::new();
        tokio::spawn(watch(batch.clone(), released.clone()));
        Self { batch, released }
    }

    /// Token to hand to the batch
    pub fn token(&self) -> CancellationToken {
        self.batch.clone()
    }

    /// Only the watcher cancels the batch token
    pub fn was_interrupted(&self) -> bool {
        self.batch.is_cancelled()
    }
}

impl Drop for CtrlCGuard {
    fn drop(&mut self) {
        self.released.cancel();
    }
}

async fn watch(batch: CancellationToken, released: CancellationToken) {
    tokio::select! {
        biased;
        () = released.cancelled() => {}
        signalled = signal::ctrl_c() => match signalled {
            Ok(()) => {
                tracing::warn!("interrupted, letting in-flight transfers finish");
                batch.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for ctrl-c"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_watcher_stops_when_released() {
        let batch = CancellationToken::new();
        let released = CancellationToken::new();
        released.cancel();

        watch(batch.clone(), released).await;
        assert!(!batch.is_cancelled());
    }

    #[tokio::test]
    async fn test_fresh_guard_is_not_interrupted() {
        let guard = CtrlCGuard::install();
        assert!(!guard.was_interrupted());
        assert!(!guard.token().is_cancelled());
    }

    #[tokio::test]
    async fn test_dropping_guard_leaves_batch_token_alone() {
        let guard = CtrlCGuard::install();
        let token = guard.token();
        drop(guard);
        tokio::task::yield_now().await;
        assert!(!token.is_cancelled());
    }
}
