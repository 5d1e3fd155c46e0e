//! Height polling
//!
//! Stands in for a push notification of inclusion: poll the latest height
//! on a fixed interval until it reaches the target, the deadline passes, or
//! the caller cancels.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::transport::{ChainStatus, Transport};
use crate::{Error, Result};

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Waits for the chain to reach a height
pub struct HeightPoller<S: ?Sized = dyn Transport> {
    status: Arc<S>,
    interval: Duration,
}

impl<S: ?Sized> Clone for HeightPoller<S> {
    fn clone(&self) -> Self {
        Self {
            status: Arc::clone(&self.status),
            interval: self.interval,
        }
    }
}

impl<S: ChainStatus + ?Sized> HeightPoller<S> {
    /// Create a poller with the default interval
    pub fn new(status: Arc<S>) -> Self {
        Self::with_interval(status, DEFAULT_POLL_INTERVAL)
    }

    /// Create a poller with a custom interval (zero is bumped to 1 ms)
    pub fn with_interval(status: Arc<S>, interval: Duration) -> Self {
        Self {
            status,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Poll interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until `height >= target`, returning the height observed.
    pub async fn wait_for_height(&self, target: u64, timeout: Duration) -> Result<u64> {
        self.wait_for_height_cancellable(target, timeout, &CancelToken::new())
            .await
    }

    /// As [`wait_for_height`](Self::wait_for_height), aborting with
    /// `Cancelled` as soon as `cancel` fires.
    ///
    /// A failed height query is logged and polling continues; on timeout
    /// the error carries the last successfully observed height.
    pub async fn wait_for_height_cancellable(
        &self,
        target: u64,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<u64> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // None when the timeout is too large to represent: wait without a bound
        let deadline = Instant::now().checked_add(timeout);
        let last_observed: Mutex<Option<u64>> = Mutex::new(None);

        let poll = async {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match self.status.latest_height().await {
                    Ok(height) => {
                        *last_observed.lock() = Some(height);
                        if height >= target {
                            return height;
                        }
                        debug!(height, target, "Waiting for height");
                    }
                    Err(e) => warn!(target, error = %e, "Height query failed, still polling"),
                }
            }
        };

        let bounded = async {
            match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, poll).await.ok(),
                None => Some(poll.await),
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(target, "Height wait cancelled");
                Err(Error::Cancelled)
            }
            reached = bounded => match reached {
                Some(height) => {
                    info!(height, target, "Height reached");
                    Ok(height)
                }
                None => {
                    let last_observed = *last_observed.lock();
                    warn!(target, ?last_observed, "Timed out waiting for height");
                    Err(Error::Timeout { target, last_observed })
                }
            },
        }
    }
}
