use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::lock;

/// Trailing-edge debounce: only the last of a burst of [`schedule`] calls
/// runs, one quiet period after it was made.
///
/// [`schedule`]: Debouncer::schedule
pub struct Debouncer {
    quiet: Duration,
    armed: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            armed: Mutex::new(None),
        }
    }

    /// Aborts the armed timer, if any, and arms a new one that runs `fire`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(
        &self,
        fire: F,
    ) where
        F: Future<Output = ()> + Send + 'static,
    {
        let quiet = self.quiet;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            fire.await;
        });
        if let Some(previous) = lock(&self.armed).replace(timer) {
            previous.abort();
        }
    }

    /// Resolves once nothing is armed or running.
    pub async fn settled(&self) {
        while self.is_armed() {
            tokio::time::sleep(self.quiet / 4).await;
        }
    }

    pub fn cancel(&self) {
        if let Some(timer) = lock(&self.armed).take() {
            timer.abort();
        }
    }

    /// `true` while a scheduled call has neither fired nor been cancelled.
    pub fn is_armed(&self) -> bool {
        lock(&self.armed)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
