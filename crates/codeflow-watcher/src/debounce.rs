//! Coalescing of bursty input

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;

/// Groups items into bursts. A burst is over once `window` passes without
/// a new item arriving.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    window: Duration,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Debouncer { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait for the next settled burst, oldest item first.
    ///
    /// Returns `None` once the channel is closed and drained. A burst cut
    /// short by the channel closing is returned right away.
    pub async fn next_batch<T>(&self, rx: &mut UnboundedReceiver<T>) -> Option<Vec<T>> {
        let mut batch = vec![rx.recv().await?];
        loop {
            tokio::select! {
                item = rx.recv() => match item {
                    Some(item) => batch.push(item),
                    None => return Some(batch),
                },
                _ = sleep(self.window) => return Some(batch),
            }
        }
    }

    /// Last item of the next settled burst.
    pub async fn next_settled<T>(&self, rx: &mut UnboundedReceiver<T>) -> Option<T> {
        self.next_batch(rx).await.and_then(|mut batch| batch.pop())
    }
}
