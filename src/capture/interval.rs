//! Cancellable interval capture.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::manager::CaptureManager;
use super::types::CaptureRequest;

/// Periodic capture schedule.
///
/// The first tick fires immediately (the original captured once on start).
/// Every tick enqueues one independent capture; a failed tick does not
/// cancel the schedule, and a slow capture never delays the next tick.
pub struct IntervalCapture {
    handle: JoinHandle<()>,
    stop_tx: watch::Sender<bool>,
}

impl IntervalCapture {
    /// Starts the schedule on the current runtime.
    ///
    /// `count` limits the number of ticks; `None` runs until [`stop`] is
    /// called.
    ///
    /// [`stop`]: IntervalCapture::stop
    pub fn start(
        manager: CaptureManager,
        request: CaptureRequest,
        period: Duration,
        count: Option<u64>,
    ) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut fired: u64 = 0;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        fired += 1;
                        log::debug!("interval capture tick {fired}");
                        if let Err(e) = manager.request_capture(request.clone()) {
                            // One failed tick is just that; keep the schedule.
                            log::error!("failed to enqueue interval capture: {e}");
                        }
                        if count.is_some_and(|c| fired >= c) {
                            break;
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            log::info!("interval capture stopped after {fired} tick(s)");
                            break;
                        }
                    }
                }
            }
        });

        Self { handle, stop_tx }
    }

    /// Signals the schedule to stop; already-enqueued captures still finish.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Waits for the schedule task to exit.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}
