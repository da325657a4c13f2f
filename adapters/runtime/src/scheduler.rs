//! Periodic tick driver.

use std::time::Duration;

use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Outcome of offering a tick to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine will apply the tick.
    Delivered,
    /// A previous tick is still waiting, so this one was dropped.
    Skipped,
    /// The engine has stopped.
    Closed,
}

/// Sends ticks to the engine without ever blocking or queueing more than one.
#[derive(Clone, Debug)]
pub struct Ticker {
    ticks: mpsc::Sender<()>,
}

impl Ticker {
    pub(crate) fn new(ticks: mpsc::Sender<()>) -> Self {
        Self { ticks }
    }

    /// Offers a single tick.
    pub fn offer(&self) -> TickOutcome {
        match self.ticks.try_send(()) {
            Ok(()) => TickOutcome::Delivered,
            Err(TrySendError::Full(())) => TickOutcome::Skipped,
            Err(TrySendError::Closed(())) => TickOutcome::Closed,
        }
    }
}

/// Emits ticks at a fixed period while started.
///
/// Stopping only halts the driver; moves queued in the world are kept and
/// resume executing after the next [`Scheduler::start`].
#[derive(Debug)]
pub struct Scheduler {
    period: Duration,
    driver: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Creates a stopped scheduler. Periods below one millisecond are raised.
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            driver: None,
        }
    }

    /// Starts ticking. The first tick fires one period from now.
    ///
    /// Starting a running scheduler has no effect.
    pub fn start(&mut self, ticker: Ticker) {
        if self.is_running() {
            return;
        }
        info!(period_ms = self.period.as_millis(), "tick scheduler started");
        self.driver = Some(tokio::spawn(drive(self.period, ticker)));
    }

    /// Stops ticking.
    pub fn stop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
            info!("tick scheduler stopped");
        }
    }

    /// Reports whether the driver task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|driver| !driver.is_finished())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

async fn drive(period: Duration, ticker: Ticker) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let _ = interval.tick().await;
        match ticker.offer() {
            TickOutcome::Delivered => {}
            TickOutcome::Skipped => debug!("engine busy, tick skipped"),
            TickOutcome::Closed => {
                debug!("engine stopped, tick driver exiting");
                break;
            }
        }
    }
}
