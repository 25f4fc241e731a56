use std::fmt::{Display, Formatter};

use chrono::{DateTime, Local, TimeDelta};
use serde::Serialize;
use serde_with::SerializeDisplay;

use crate::{
    core::{
        pattern::{Coverage, Symbol, blend},
        rate::RateRecord,
        tariff::Thresholds,
    },
    ops::{Interval, start_of_day},
    prelude::*,
};

/// Polling delay when there are no levels at all.
const NO_LEVELS_DELAY: TimeDelta = TimeDelta::seconds(5);

/// Levels resampled onto a grid that starts at local midnight.
#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct LevelStrip {
    pub start: DateTime<Local>,

    /// Zero when there are no rates.
    #[serde(rename = "step_minutes", serialize_with = "serialize_minutes")]
    pub step: TimeDelta,

    pub levels: String,
    pub thresholds: Thresholds,
}

impl LevelStrip {
    /// Build the strip of the day containing `now`.
    ///
    /// The step is rounded up to whole minutes, and zero `step` means the length of the first rate slot.
    /// With `fill_unknown`, a non-empty strip is padded with unknown levels to cover two days.
    pub fn new(
        rates: &[RateRecord],
        thresholds: Thresholds,
        now: DateTime<Local>,
        step: TimeDelta,
        fill_unknown: bool,
    ) -> Self {
        let start = start_of_day(now);
        let step = if step > TimeDelta::zero() {
            step
        } else {
            rates.first().map_or_else(TimeDelta::zero, |rate| rate.interval.len())
        };
        let step =
            div_ceil(step, TimeDelta::minutes(1)).map_or_else(TimeDelta::zero, TimeDelta::minutes);
        let Some(end) = rates.iter().map(|rate| rate.interval.end).max() else {
            return Self { start, step: TimeDelta::zero(), levels: String::new(), thresholds };
        };
        let Some(n_covered) = div_ceil(end - start, step) else {
            return Self { start, step: TimeDelta::zero(), levels: String::new(), thresholds };
        };

        let levels: String = (0..i32::try_from(n_covered).unwrap_or_default())
            .map(|index| {
                let interval = Interval::starting_at(start + step * index, step);
                char::from(blend(rates, interval, Coverage::Partial))
            })
            .collect();
        let mut strip = Self { start, step, levels, thresholds };
        if fill_unknown && !strip.levels.is_empty() {
            let n_two_days = TimeDelta::days(2)
                .num_minutes()
                .checked_div(step.num_minutes())
                .and_then(|n_steps| usize::try_from(n_steps).ok())
                .unwrap_or_default();
            while strip.levels.len() < n_two_days {
                strip.levels.push(char::from(Symbol::Unknown));
            }
        }
        debug!(step = ?strip.step, levels = %strip.levels, "built the level strip");
        strip
    }

    fn is_empty(&self) -> bool {
        self.levels.is_empty() || self.step < TimeDelta::minutes(1)
    }

    /// Index of the step containing `now`, negative before the strip start.
    fn index(&self, now: DateTime<Local>) -> i64 {
        (now - self.start)
            .num_milliseconds()
            .checked_div_euclid(self.step.num_milliseconds())
            .unwrap_or_default()
    }

    fn symbol_at(&self, index: i64) -> char {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.levels.chars().nth(index))
            .unwrap_or_else(|| char::from(Symbol::Unknown))
    }

    /// Level character of the step containing `now`.
    #[must_use]
    pub fn current_level(&self, now: DateTime<Local>) -> char {
        if self.is_empty() { char::from(Symbol::Unknown) } else { self.symbol_at(self.index(now)) }
    }

    /// Time left until the next step boundary.
    #[must_use]
    pub fn next_update(&self, now: DateTime<Local>) -> TimeDelta {
        if self.is_empty() {
            return NO_LEVELS_DELAY;
        }
        let step = self.step.num_milliseconds();
        TimeDelta::milliseconds(step - (now - self.start).num_milliseconds().rem_euclid(step))
    }
}

/// Levels around the current instant: `{minutes}:{step}:{passed}:{upcoming}`.
///
/// The passed window spans the hour before the current step,
/// the upcoming one spans 12 hours starting with the current step.
/// Steps outside the strip are unknown.
#[derive(Clone, Debug, Eq, PartialEq, SerializeDisplay)]
pub struct CompactLevels {
    pub minutes_since_midnight: i64,
    pub step_minutes: i64,
    pub passed: String,
    pub upcoming: String,
}

impl Display for CompactLevels {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.minutes_since_midnight, self.step_minutes, self.passed, self.upcoming
        )
    }
}

impl CompactLevels {
    pub fn new(strip: &LevelStrip, now: DateTime<Local>) -> Self {
        let minutes_since_midnight = (now - strip.start).num_minutes();
        if strip.is_empty() {
            return Self {
                minutes_since_midnight,
                step_minutes: 0,
                passed: String::new(),
                upcoming: String::new(),
            };
        }
        let step_minutes = strip.step.num_minutes();
        let per_hour = 60_i64.checked_div(step_minutes).unwrap_or_default();
        let index = strip.index(now);
        let window = |range: std::ops::Range<i64>| -> String {
            range.map(|index| strip.symbol_at(index)).collect()
        };
        Self {
            minutes_since_midnight,
            step_minutes,
            passed: window((index - per_hour)..index),
            upcoming: window(index..(index + 12 * per_hour)),
        }
    }
}

/// Number of steps needed to cover the span, [`None`] unless the step is positive.
fn div_ceil(span: TimeDelta, step: TimeDelta) -> Option<i64> {
    let (span, step) = (span.num_milliseconds(), step.num_milliseconds());
    (step > 0).then(|| span.div_euclid(step) + i64::from(span.rem_euclid(step) != 0))
}

fn serialize_minutes<S: serde::Serializer>(
    step: &TimeDelta,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(step.num_minutes())
}
