use bon::Builder;
use chrono::{DateTime, Local, TimeDelta};
use itertools::iterate;

use crate::{
    core::{level::Level, rate::RateRecord},
    ops::Interval,
    prelude::*,
};

/// Anything that classifies a time interval.
pub trait Classified {
    fn interval(&self) -> Interval;
    fn level(&self) -> Level;
}

impl Classified for RateRecord {
    fn interval(&self) -> Interval {
        self.interval
    }

    fn level(&self) -> Level {
        self.level
    }
}

impl Classified for (Interval, Level) {
    fn interval(&self) -> Interval {
        self.0
    }

    fn level(&self) -> Level {
        self.1
    }
}

/// Single character of a level pattern.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Symbol {
    Low,
    Medium,
    High,

    /// No classified data for the step.
    Unknown,
}

impl From<Symbol> for char {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::Low => 'L',
            Symbol::Medium => 'M',
            Symbol::High => 'H',
            Symbol::Unknown => 'U',
        }
    }
}

impl Symbol {
    /// Threshold the mean of the level weights: above 2 is high, above 1 is medium,
    /// anything else is low. No weights at all is unknown.
    pub fn from_weights(weights: impl IntoIterator<Item = u32>) -> Self {
        let (sum, count) =
            weights.into_iter().fold((0, 0), |(sum, count), weight| (sum + weight, count + 1));
        if count == 0 {
            Self::Unknown
        } else if sum > 2 * count {
            Self::High
        } else if sum > count {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// How a classification has to meet a step to take part in its blend.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Coverage {
    /// The classification spans the whole step.
    Full,

    /// Any overlap counts.
    Partial,
}

impl Coverage {
    fn applies(self, interval: Interval, step: Interval) -> bool {
        match self {
            Self::Full => interval.covers(step),
            Self::Partial => interval.overlaps(step),
        }
    }
}

/// Blend every classification that meets the step into a single symbol.
///
/// Levels are weighted `Low = 1`, `Medium = 2` and `High = 3`. Unknown levels do not count.
pub fn blend<C: Classified>(classifications: &[C], step: Interval, coverage: Coverage) -> Symbol {
    Symbol::from_weights(
        classifications
            .iter()
            .filter(|classified| coverage.applies(classified.interval(), step))
            .filter_map(|classified| classified.level().weight()),
    )
}

/// Fixed-grid resampler producing a constant-length level pattern.
#[must_use]
#[derive(Copy, Clone, Debug, Builder)]
pub struct Resampler {
    #[builder(default = TimeDelta::minutes(12))]
    pub step: TimeDelta,

    #[builder(default = TimeDelta::hours(36))]
    pub window: TimeDelta,
}

impl Default for Resampler {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Resampler {
    #[must_use]
    pub fn n_steps(self) -> usize {
        self.window
            .num_milliseconds()
            .checked_div(self.step.num_milliseconds())
            .and_then(|n_steps| usize::try_from(n_steps).ok())
            .unwrap_or_default()
    }

    /// Iterate the grid steps starting at `start`.
    pub fn steps(self, start: DateTime<Local>) -> impl Iterator<Item = Interval> {
        iterate(start, move |start| *start + self.step)
            .take(self.n_steps())
            .map(move |start| Interval::starting_at(start, self.step))
    }

    /// Resample the classifications onto the grid starting at `start`.
    #[must_use]
    pub fn resample<C: Classified>(self, classifications: &[C], start: DateTime<Local>) -> String {
        self.steps(start)
            .map(|step| char::from(blend(classifications, step, Coverage::Full)))
            .collect()
    }

    /// Resample starting at the earliest classification, or an all-unknown pattern if there is none.
    #[must_use]
    pub fn pattern<C: Classified>(self, classifications: &[C]) -> String {
        match classifications.iter().map(|classified| classified.interval().start).min() {
            Some(start) => {
                let pattern = self.resample(classifications, start);
                debug!(%pattern, "generated");
                pattern
            }
            None => char::from(Symbol::Unknown).to_string().repeat(self.n_steps()),
        }
    }
}
