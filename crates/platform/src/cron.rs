//! Periodic trigger for the enqueue endpoint.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::client::InternalClient;
use crate::queue::Task;

/// Path the cron calls on every tick.
pub const CRON_PATH: &str = "/stores/do";

/// Background ticker that calls [`CRON_PATH`] on a fixed interval.
#[derive(Debug)]
pub struct Cron {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Cron {
    /// Start ticking every `interval`. Returns `None` when the interval is zero.
    ///
    /// The first call happens one interval after start.
    #[must_use]
    pub fn start(client: InternalClient, interval: Duration) -> Option<Self> {
        if interval.is_zero() {
            info!("Cron disabled");
            return None;
        }

        let (shutdown, mut shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the first tick which fires immediately
            ticker.tick().await;

            let task = Task::get(CRON_PATH);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        debug!(path = CRON_PATH, "Cron tick");
                        if let Err(e) = client.send(&task).await {
                            warn!(path = CRON_PATH, error = %e, "Cron request failed");
                        }
                    }
                }
            }
        });

        info!(interval_secs = interval.as_secs(), "Cron started");
        Some(Self { shutdown, handle })
    }

    /// Stop ticking and wait for the ticker to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Cron task failed");
        }
        info!("Cron stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;

    #[tokio::test]
    async fn test_zero_interval_disables() {
        let client = InternalClient::new("http://127.0.0.1:9", None).unwrap();
        assert!(Cron::start(client, Duration::ZERO).is_none());
    }

    #[tokio::test]
    async fn test_ticks_call_enqueue_endpoint() {
        let recorder = Recorder::serve().await;
        let client = InternalClient::new(&recorder.base_url, Some("s3cret".into())).unwrap();

        let cron = Cron::start(client, Duration::from_millis(50)).unwrap();
        let hits = recorder.wait_for(2).await;
        cron.stop().await;

        assert!(hits.iter().all(|h| h.path == CRON_PATH));
        assert!(hits.iter().all(|h| h.token.as_deref() == Some("s3cret")));

        let after_stop = recorder.hits().len();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(recorder.hits().len(), after_stop);
    }
}
