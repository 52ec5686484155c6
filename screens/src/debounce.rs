// screens/src/debounce.rs

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Delay between a search keystroke and the request it triggers.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// One pending task at a time: scheduling cancels whatever was waiting and
/// restarts the delay. Dropping the debouncer (screen teardown) cancels
/// the pending task too.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
