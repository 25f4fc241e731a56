use std::time::Duration;

use tokio::{sync::watch, task::JoinHandle, time::sleep};

use crate::{
    prelude::*,
    scheduler::{Phase, PriceConsumer, PriceService, Scheduler, Status},
};

/// Delay before the very first cycle.
const INITIAL_DELAY: Duration = Duration::from_millis(100);

impl<S, C> Scheduler<S, C>
where
    S: PriceService + 'static,
    C: PriceConsumer + 'static,
{
    /// Spawn the scheduling loop, starting from scratch.
    ///
    /// At most one cycle runs at a time, and the next one is armed only after the previous completes.
    /// Dropping the handle stops the loop just like [`Handle::stop`].
    pub fn start(mut self) -> Handle {
        self.reset();
        let (is_running_sender, mut is_running) = watch::channel(true);
        let (status_sender, status) = watch::channel(self.status);

        let task = tokio::spawn(async move {
            info!("starting the scheduler…");
            let mut delay = INITIAL_DELAY;
            loop {
                tokio::select! {
                    () = sleep(delay) => {}
                    result = is_running.changed() => {
                        if result.is_err() {
                            break;
                        }
                    }
                }
                if !*is_running.borrow() {
                    break;
                }
                delay = self.tick().await;
                status_sender.send_replace(self.status());
                if !*is_running.borrow() {
                    info!("stopped during the cycle");
                    break;
                }
            }
            self.status.phase = Phase::Stopped;
            status_sender.send_replace(self.status);
            info!("stopped");
        });

        Handle { is_running: is_running_sender, status, task }
    }
}

#[must_use]
pub struct Handle {
    is_running: watch::Sender<bool>,
    status: watch::Receiver<Status>,
    task: JoinHandle<()>,
}

impl Handle {
    /// Stop the loop. A cycle in flight completes, but no further cycle is armed.
    pub fn stop(&self) {
        if self.is_running.send_replace(false) {
            info!("stopping the scheduler…");
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_running(&self) -> bool {
        *self.is_running.borrow()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        *self.status.borrow()
    }

    /// Subscribe to the status updates, sent after every cycle.
    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.clone()
    }

    /// Wait for the loop to finish.
    pub async fn join(self) -> Result {
        self.task.await.context("the scheduler task has failed")
    }
}
