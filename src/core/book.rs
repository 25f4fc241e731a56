use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{
    core::{
        level::{Level, Rank},
        rate::{RateRecord, RawPriceEntry, compute_rates},
        tariff::{FeeConfiguration, Thresholds},
    },
    ops::Interval,
    prelude::*,
    quantity::rate::KilowattHourRate,
};

/// Energy unit the costs are expressed in.
pub const UNIT: &str = "kWh";

/// Last computed rate records together with what is needed to publish them.
#[must_use]
pub struct RateBook {
    fees: FeeConfiguration,
    currency: Option<String>,
    rates: Vec<RateRecord>,

    /// Set when the last delivered curve failed to compute.
    is_malformed: bool,
}

impl RateBook {
    pub const fn new(fees: FeeConfiguration) -> Self {
        Self { fees, currency: None, rates: Vec::new(), is_malformed: false }
    }

    /// Replace the records with the ones computed from the delivered curve.
    ///
    /// A curve that fails to compute clears the records, and the book reports
    /// [`Level::ErrorProcessingData`] until the next successful update.
    #[instrument(skip_all, fields(currency = ?currency, n_entries = raw.len()))]
    pub fn update(&mut self, currency: Option<String>, raw: &[RawPriceEntry]) {
        if currency.is_some() {
            self.currency = currency;
        }
        match compute_rates(raw, &self.fees) {
            Ok(rates) => {
                debug!(n_rates = rates.len(), "updated");
                self.rates = rates;
                self.is_malformed = false;
            }
            Err(error) => {
                error!("failed to process the price curve: {error:#}");
                self.rates.clear();
                self.is_malformed = true;
            }
        }
    }

    pub fn rates(&self) -> &[RateRecord] {
        &self.rates
    }

    pub const fn thresholds(&self) -> Thresholds {
        self.fees.thresholds
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    /// Drop the records starting before the local date of `now`, and look up the one containing `now`.
    pub fn current(&mut self, now: DateTime<Local>) -> Snapshot {
        let today = now.date_naive();
        let n_rates = self.rates.len();
        self.rates.retain(|rate| rate.interval.start.date_naive() >= today);
        if self.rates.len() != n_rates {
            debug!(n_purged = n_rates - self.rates.len(), "purged stale rates");
        }

        let current = self.rates.iter().find(|rate| rate.interval.contains(now)).copied();
        let level = match current {
            Some(rate) => rate.level,
            None if self.is_malformed => Level::ErrorProcessingData,
            None => Level::Unknown,
        };
        let thresholds = self.thresholds();
        Snapshot {
            interval: current.map(|rate| rate.interval),
            spot_price: current.map_or(KilowattHourRate::ZERO, |rate| rate.spot_price),
            cost: current.map_or(KilowattHourRate::ZERO, |rate| rate.cost),
            credit: current.map_or(KilowattHourRate::ZERO, |rate| rate.credit),
            level,
            rank: current.map_or(Rank::Unranked, |rate| rate.rank),
            low_threshold: Some(thresholds.low).filter(|threshold| threshold.0.is_finite()),
            high_threshold: Some(thresholds.high).filter(|threshold| threshold.0.is_finite()),
            unit: UNIT,
            unit_of_measurement: self.currency.as_ref().map(|currency| format!("{currency}/{UNIT}")),
            currency: self.currency.clone(),
            rates: self.rates.clone(),
        }
    }
}

/// Externally visible state of the rates at a given instant.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    /// Slot of the current record, if any.
    #[serde(skip)]
    pub interval: Option<Interval>,

    pub spot_price: KilowattHourRate,
    pub cost: KilowattHourRate,
    pub credit: KilowattHourRate,
    pub level: Level,
    pub rank: Rank,
    pub low_threshold: Option<KilowattHourRate>,
    pub high_threshold: Option<KilowattHourRate>,
    pub currency: Option<String>,
    pub unit: &'static str,
    pub unit_of_measurement: Option<String>,
    pub rates: Vec<RateRecord>,
}
