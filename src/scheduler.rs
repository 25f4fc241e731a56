//! Self-rescheduling acquisition of today's and tomorrow's day-ahead prices.

mod cache;
mod clock;
mod fetch;
mod handle;
mod policy;

use std::{sync::Arc, time::Duration};

use bon::Builder;

pub use self::{
    cache::{Cache, Target},
    clock::{Clock, SystemClock},
    fetch::{FetchOutcome, FetchStatus, PriceService, ServiceError, fetch},
    handle::Handle,
    policy::{DelayPolicy, Phase},
};
use crate::{core::rate::RawPriceEntry, prelude::*};

/// Receives the cached prices after every cycle.
pub trait PriceConsumer: Send {
    fn update(&mut self, currency: Option<String>, raw: Vec<RawPriceEntry>);
}

/// Diagnostic state of the scheduler.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Status {
    pub phase: Phase,
    pub last_fetch: Option<FetchStatus>,
}

impl Default for Status {
    fn default() -> Self {
        Self { phase: Phase::Initializing, last_fetch: None }
    }
}

#[must_use]
#[derive(Builder)]
pub struct Scheduler<S, C> {
    service: S,
    consumer: C,

    #[builder(default = Arc::new(SystemClock))]
    clock: Arc<dyn Clock>,

    #[builder(default)]
    policy: DelayPolicy,

    #[builder(skip)]
    cache: Cache,

    /// Last known currency, kept when a fetch cannot tell it.
    #[builder(skip)]
    currency: Option<String>,

    #[builder(skip)]
    status: Status,
}

impl<S: PriceService, C: PriceConsumer> Scheduler<S, C> {
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Forget everything fetched so far.
    pub fn reset(&mut self) {
        self.cache = Cache::default();
        self.currency = None;
        self.status = Status::default();
    }

    /// Run one scheduling cycle and return the delay until the next one.
    ///
    /// Provider failures never escape: they only affect the returned delay.
    #[instrument(skip_all)]
    pub async fn tick(&mut self) -> Duration {
        let today = self.clock.now().date_naive();
        if self.cache.roll_over(today) {
            info!(%today, "rolled the cache over");
        }

        let mut fetched_today = false;
        if let Some(target) = self.cache.target(today) {
            let date = target.date(today);
            debug!(%target, %date, phase = %self.status.phase, "fetching the prices");
            let outcome = fetch(&self.service, date).await;
            self.status.last_fetch = Some(outcome.status());
            match outcome {
                FetchOutcome::Data { currency, raw } => {
                    if currency.is_some() {
                        self.currency = currency;
                    }
                    self.cache.store(target, today, raw);
                    fetched_today = target == Target::Today;
                }
                outcome => {
                    warn!(%target, %date, status = %outcome.status(), "no prices this time");
                }
            }
        } else {
            debug!(%today, "the cache is fresh");
        }

        self.consumer.update(self.currency.clone(), self.cache.merged(today));

        let now = self.clock.now();
        if now.date_naive() != today {
            // The cycle crossed midnight, let the next one roll over.
            return policy::MIN_DELAY;
        }
        let (phase, delay) = self.policy.next(now, &self.cache, fetched_today);
        self.status.phase = phase;
        info!(%phase, delay = %humantime::format_duration(delay), "scheduled the next cycle");
        delay
    }
}
