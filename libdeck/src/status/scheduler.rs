use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::log::*;

/// Owned handle to a recurring poll timer. The timer fires once as soon as
/// it starts and then once per period until [`PollScheduler::stop`] is
/// called or the handle is dropped.
#[derive(Debug)]
pub struct PollScheduler {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollScheduler {
    /// Start ticking. `on_tick` returning `false` also stops the timer, which
    /// is how a scheduler notices its console went away.
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let period = period.max(Duration::from_millis(1));
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        trace!("poll scheduler tick");
                        if !on_tick() {
                            debug!("poll scheduler lost its receiver");
                            break;
                        }
                    }
                }
            }
            debug!("poll scheduler stopped");
        });

        Self { cancel, task }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled() || self.task.is_finished()
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
