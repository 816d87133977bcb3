use std::time::Duration;

use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, trace};

use super::state::Action;

/// The single auto-refresh ticker. Arming always cancels the previous ticker
/// first, and dropping the timer cancels it too.
///
/// Every arm or disarm bumps `generation`; ticks carry the generation they were
/// sent under so ones already queued from a cancelled ticker can be told apart.
#[derive(Debug, Default)]
pub struct RefreshTimer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl RefreshTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start sending [`Action::TimerTick`] to `events` every `period`,
    /// the first one a full `period` from now.
    pub fn arm(&mut self, period: Duration, events: UnboundedSender<Action>) {
        self.disarm();
        self.generation += 1;
        let generation = self.generation;

        debug!(?period, generation, "arming refresh timer");
        self.handle = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticks.tick().await;
                trace!("refresh timer fired");
                if events.send(Action::TimerTick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(generation = self.generation, "disarming refresh timer");
            handle.abort();
            self.generation += 1;
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a tick sent under `generation` came from the ticker running now.
    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && generation == self.generation
    }

    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
