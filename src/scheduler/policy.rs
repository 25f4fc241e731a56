use std::time::Duration;

use bon::Builder;
use chrono::{DateTime, Days, Local, NaiveTime};

use crate::{ops::at_local, prelude::*, scheduler::cache::Cache};

/// Delay right after today's prices arrive past the publish time.
pub const IMMEDIATE_DELAY: Duration = Duration::from_millis(100);

/// Any other delay is at least this long.
pub const MIN_DELAY: Duration = Duration::from_secs(1);

/// Reason for the currently scheduled delay.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Phase {
    #[display("INITIALIZING")]
    Initializing,

    #[display("RETRYING_TODAY")]
    RetryingToday,

    #[display("WAITING_FOR_PUBLISH_TIME")]
    WaitingForPublishTime,

    #[display("FETCHING_TOMORROW_NOW")]
    FetchingTomorrowNow,

    #[display("RETRYING_TOMORROW")]
    RetryingTomorrow,

    #[display("SLEEPING_UNTIL_NEXT_PUBLISH_TIME")]
    SleepingUntilNextPublishTime,

    #[display("STOPPED")]
    Stopped,
}

#[must_use]
#[derive(Copy, Clone, Debug, Builder)]
pub struct DelayPolicy {
    /// Local time when the next day prices are expected to be published.
    #[builder(default = NaiveTime::from_hms_opt(13, 0, 0).unwrap_or_default())]
    pub publish_time: NaiveTime,

    #[builder(default = Duration::from_secs(15))]
    pub today_retry_interval: Duration,

    #[builder(default = Duration::from_secs(120))]
    pub tomorrow_retry_interval: Duration,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DelayPolicy {
    /// Decide how long to sleep until the next cycle.
    ///
    /// `fetched_today` tells whether today's prices have arrived during the cycle just finished.
    pub fn next(
        self,
        now: DateTime<Local>,
        cache: &Cache,
        fetched_today: bool,
    ) -> (Phase, Duration) {
        let today = now.date_naive();
        if !cache.has_today(today) {
            return (Phase::RetryingToday, self.today_retry_interval.max(MIN_DELAY));
        }
        if cache.has_tomorrow(today) {
            let next_day = today.checked_add_days(Days::new(1)).unwrap_or(today);
            let next_publish_time = at_local(next_day, self.publish_time);
            return (Phase::SleepingUntilNextPublishTime, self.until(now, next_publish_time));
        }
        match at_local(today, self.publish_time) {
            Some(publish_time) if now < publish_time => {
                (Phase::WaitingForPublishTime, self.until(now, Some(publish_time)))
            }
            _ if fetched_today => (Phase::FetchingTomorrowNow, IMMEDIATE_DELAY),
            _ => (Phase::RetryingTomorrow, self.tomorrow_retry_interval.max(MIN_DELAY)),
        }
    }

    fn until(self, now: DateTime<Local>, instant: Option<DateTime<Local>>) -> Duration {
        let Some(instant) = instant else {
            warn!(publish_time = %self.publish_time, "the publish time does not exist locally");
            return self.tomorrow_retry_interval.max(MIN_DELAY);
        };
        (instant - now).to_std().unwrap_or_default().max(MIN_DELAY)
    }
}
