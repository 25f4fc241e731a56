use chrono::NaiveTime;
use clap::Parser;

use crate::scheduler::DelayPolicy;

#[derive(Parser)]
pub struct ScheduleArgs {
    /// Local time when the next day prices get published.
    #[clap(long, env = "PUBLISH_TIME", default_value = "13:00:00")]
    pub publish_time: NaiveTime,

    /// Retry interval while today's prices are missing.
    #[clap(long, env = "TODAY_RETRY_INTERVAL", default_value = "15s")]
    pub today_retry_interval: humantime::Duration,

    /// Retry interval while tomorrow's prices are missing past the publish time.
    #[clap(long, env = "TOMORROW_RETRY_INTERVAL", default_value = "2min")]
    pub tomorrow_retry_interval: humantime::Duration,
}

impl ScheduleArgs {
    pub fn policy(&self) -> DelayPolicy {
        DelayPolicy::builder()
            .publish_time(self.publish_time)
            .today_retry_interval(self.today_retry_interval.into())
            .tomorrow_retry_interval(self.tomorrow_retry_interval.into())
            .build()
    }
}
