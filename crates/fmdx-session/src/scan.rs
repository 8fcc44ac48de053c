//! Spectrum scan: trigger, then poll for results until a deadline.
//!
//! The poll task never touches session state.  It reports back through the
//! core's event channel, tagged with the generation it was started in, and
//! exits quietly once cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::collab::{ScanChannel, SpectrumFetcher};
use crate::core::SessionEvent;
use crate::error::SessionError;

pub struct ScanJob {
    pub generation: u64,
    pub channel: Arc<dyn ScanChannel>,
    pub fetcher: Arc<dyn SpectrumFetcher>,
    pub endpoint: String,
    pub identity: String,
    pub poll_interval: Duration,
    pub deadline: Duration,
    pub events: mpsc::Sender<SessionEvent>,
    pub cancel: CancellationToken,
}

impl ScanJob {
    pub async fn run(self) {
        let generation = self.generation;
        if let Err(e) = self.channel.trigger_scan().await {
            warn!("scan: trigger failed: {}", e);
            self.report(SessionEvent::SpectrumError {
                generation,
                message: e.to_string(),
            })
            .await;
        }

        let deadline = Instant::now() + self.deadline;
        let mut committed = false;
        let mut polls = 0u32;

        while Instant::now() < deadline {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("scan: cancelled after {} polls", polls);
                    return;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            polls += 1;
            let fetched = tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("scan: cancelled during poll {}", polls);
                    return;
                }
                r = self.fetcher.fetch_spectrum(&self.endpoint, &self.identity) => r,
            };

            match fetched {
                Ok(points) if !points.is_empty() => {
                    info!("scan: {} points after {} polls", points.len(), polls);
                    self.report(SessionEvent::SpectrumFetched { generation, points })
                        .await;
                    committed = true;
                    break;
                }
                Ok(_) => debug!("scan: poll {} empty", polls),
                Err(e) => {
                    debug!("scan: poll {} failed: {}", polls, e);
                    self.report(SessionEvent::SpectrumError {
                        generation,
                        message: e.to_string(),
                    })
                    .await;
                }
            }
        }

        if !committed {
            info!("scan: {} after {} polls, keeping spectrum", SessionError::ScanTimeout, polls);
        }
        self.report(SessionEvent::ScanFinished { generation }).await;
    }

    async fn report(&self, event: SessionEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.events.send(event).await;
    }
}
