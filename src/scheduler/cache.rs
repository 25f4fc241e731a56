use chrono::{Days, NaiveDate};

use crate::core::rate::RawPriceEntry;

/// Which day a fetch is for, relative to the local date.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Target {
    #[display("TODAY")]
    Today,

    #[display("TOMORROW")]
    Tomorrow,
}

impl Target {
    #[must_use]
    pub fn date(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::Today => today,
            Self::Tomorrow => tomorrow(today),
        }
    }
}

/// Raw prices of a single day.
#[derive(Clone, Debug, Default)]
pub struct DayEntry {
    pub date: Option<NaiveDate>,
    pub raw: Option<Vec<RawPriceEntry>>,
}

impl DayEntry {
    fn is_valid_for(&self, date: NaiveDate) -> bool {
        self.raw.is_some() && (self.date == Some(date))
    }
}

/// Raw prices of the current and the next local date.
#[derive(Clone, Debug, Default)]
pub struct Cache {
    pub current: DayEntry,
    pub next: DayEntry,
}

impl Cache {
    /// Shift the next day in place of the current one once the current date is in the past.
    ///
    /// Returns whether the cache has been rolled over.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.current.date.is_some_and(|date| date < today) {
            self.current = std::mem::take(&mut self.next);
            true
        } else {
            false
        }
    }

    /// Pick the day to fetch, today always goes first.
    #[must_use]
    pub fn target(&self, today: NaiveDate) -> Option<Target> {
        if !self.has_today(today) {
            Some(Target::Today)
        } else if !self.has_tomorrow(today) {
            Some(Target::Tomorrow)
        } else {
            None
        }
    }

    #[must_use]
    pub fn has_today(&self, today: NaiveDate) -> bool {
        self.current.is_valid_for(today)
    }

    #[must_use]
    pub fn has_tomorrow(&self, today: NaiveDate) -> bool {
        self.next.is_valid_for(tomorrow(today))
    }

    pub fn store(&mut self, target: Target, today: NaiveDate, raw: Vec<RawPriceEntry>) {
        let entry = DayEntry { date: Some(target.date(today)), raw: Some(raw) };
        match target {
            Target::Today => self.current = entry,
            Target::Tomorrow => self.next = entry,
        }
    }

    /// Concatenated raw prices of the days that are valid for `today`.
    #[must_use]
    pub fn merged(&self, today: NaiveDate) -> Vec<RawPriceEntry> {
        let current = self.current.raw.as_deref().filter(|_| self.has_today(today));
        let next = self.next.raw.as_deref().filter(|_| self.has_tomorrow(today));
        current.into_iter().chain(next).flatten().cloned().collect()
    }
}

fn tomorrow(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}
