use chrono::TimeDelta;
use clap::Parser;

use crate::{core::pattern::Resampler, prelude::*};

#[derive(Parser)]
pub struct PatternArgs {
    /// Level pattern step.
    #[clap(long = "pattern-step", env = "PATTERN_STEP", default_value = "12min")]
    pub step: humantime::Duration,

    /// Level pattern window.
    #[clap(long = "pattern-window", env = "PATTERN_WINDOW", default_value = "36h")]
    pub window: humantime::Duration,

    /// Level strip step, `0s` to follow the rate slots.
    #[clap(long = "strip-step", env = "STRIP_STEP", default_value = "0s")]
    pub strip_step: humantime::Duration,

    /// Pad the level strip with unknown levels up to two days.
    #[clap(long = "strip-fill-unknown", env = "STRIP_FILL_UNKNOWN")]
    pub fill_unknown: bool,
}

impl PatternArgs {
    pub fn resampler(&self) -> Result<Resampler> {
        let step = to_delta(self.step)?;
        ensure!(step >= TimeDelta::milliseconds(1), "the pattern step must be at least 1ms");
        Ok(Resampler::builder().step(step).window(to_delta(self.window)?).build())
    }

    pub fn strip_step(&self) -> Result<TimeDelta> {
        let step = to_delta(self.strip_step)?;
        ensure!(
            step.subsec_nanos() == 0 && step.num_seconds() % 60 == 0,
            "the strip step must be a whole number of minutes, got `{}`",
            self.strip_step,
        );
        Ok(step)
    }
}

fn to_delta(duration: humantime::Duration) -> Result<TimeDelta> {
    TimeDelta::from_std(duration.into()).with_context(|| format!("`{duration}` is too long"))
}
