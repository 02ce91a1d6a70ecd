//! Re-fetching a check while its detail view is mounted.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::CheckDetails;

pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Where a mounted view reads its check from.
#[async_trait]
pub trait CheckSource: Send + Sync + 'static {
    async fn fetch_check(&self, check_id: &str) -> Result<CheckDetails, String>;
}

/// Polls one check at a fixed interval until dropped.
///
/// The first fetch happens on mount. Polling does not stop on a terminal
/// status. Every tick starts its own fetch, so a slow upstream can leave
/// several reads for the same id in flight at once; they resolve into the
/// same channel and the last one to arrive wins.
///
/// Dropping the poller cancels the timer only. Fetches already in flight
/// finish on their own and their results are discarded because the
/// receiving side is gone.
pub struct CheckPoller {
    timer: JoinHandle<()>,
    updates: mpsc::UnboundedReceiver<Result<CheckDetails, String>>,
}

impl CheckPoller {
    pub fn mount<S: CheckSource>(source: Arc<S>, check_id: impl Into<String>) -> Self {
        Self::mount_with_interval(source, check_id, POLL_INTERVAL)
    }

    pub fn mount_with_interval<S: CheckSource>(
        source: Arc<S>,
        check_id: impl Into<String>,
        every: Duration,
    ) -> Self {
        let check_id = check_id.into();
        let (tx, updates) = mpsc::unbounded_channel();

        let timer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                debug!("Polling check {}", check_id);

                let source = source.clone();
                let tx = tx.clone();
                let check_id = check_id.clone();
                tokio::spawn(async move {
                    let outcome = source.fetch_check(&check_id).await;
                    if tx.send(outcome).is_err() {
                        debug!("Dropping result for unmounted check {}", check_id);
                    }
                });
            }
        });

        Self { timer, updates }
    }

    /// Next resolved fetch, in completion order.
    pub async fn next(&mut self) -> Option<Result<CheckDetails, String>> {
        self.updates.recv().await
    }

    pub fn unmount(self) {}
}

impl Drop for CheckPoller {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
