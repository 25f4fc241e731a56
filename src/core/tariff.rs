use bon::Builder;
use serde::Serialize;

use crate::{
    core::level::Level,
    quantity::{percent::Percent, rate::KilowattHourRate},
};

/// Retail tariff applied on top of the spot price.
///
/// Every field defaults to zero, so an empty configuration passes the spot price through.
#[must_use]
#[derive(Copy, Clone, Debug, Default, Builder)]
pub struct FeeConfiguration {
    #[builder(default)]
    pub supplier_fixed_fee: KilowattHourRate,

    #[builder(default)]
    pub supplier_variable_fee: Percent,

    #[builder(default)]
    pub supplier_fixed_credit: KilowattHourRate,

    #[builder(default)]
    pub supplier_variable_credit: Percent,

    #[builder(default)]
    pub grid_fixed_fee: KilowattHourRate,

    #[builder(default)]
    pub grid_variable_fee: Percent,

    #[builder(default)]
    pub grid_fixed_credit: KilowattHourRate,

    #[builder(default)]
    pub grid_variable_credit: Percent,

    /// Energy tax per kilowatt-hour, subject to VAT.
    #[builder(default)]
    pub energy_tax: KilowattHourRate,

    #[builder(default)]
    pub vat: Percent,

    #[builder(default)]
    pub thresholds: Thresholds,
}

impl FeeConfiguration {
    /// Total cost of buying a kilowatt-hour, VAT included.
    pub fn cost(&self, spot: KilowattHourRate) -> KilowattHourRate {
        let variable = 1.0 + self.supplier_variable_fee.fraction() + self.grid_variable_fee.fraction();
        let before_vat =
            spot * variable + self.supplier_fixed_fee + self.grid_fixed_fee + self.energy_tax;
        (before_vat * (1.0 + self.vat.fraction())).round()
    }

    /// Credit for selling a kilowatt-hour back. No tax or VAT applies.
    pub fn credit(&self, spot: KilowattHourRate) -> KilowattHourRate {
        let variable =
            1.0 + self.supplier_variable_credit.fraction() + self.grid_variable_credit.fraction();
        (spot * variable + self.supplier_fixed_credit + self.grid_fixed_credit).round()
    }
}

/// Cost thresholds separating the levels. Both are exclusive.
#[must_use]
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Thresholds {
    pub low: KilowattHourRate,
    pub high: KilowattHourRate,
}

impl Default for Thresholds {
    /// Without thresholds every slot is [`Level::Medium`].
    fn default() -> Self {
        Self {
            low: KilowattHourRate(f64::NEG_INFINITY),
            high: KilowattHourRate(f64::INFINITY),
        }
    }
}

impl Thresholds {
    pub fn new(low: Option<KilowattHourRate>, high: Option<KilowattHourRate>) -> Self {
        let default = Self::default();
        Self { low: low.unwrap_or(default.low), high: high.unwrap_or(default.high) }
    }

    /// Classify the cost, a cost equal to either threshold is [`Level::Medium`].
    pub fn level(self, cost: KilowattHourRate) -> Level {
        if cost < self.low {
            Level::Low
        } else if cost > self.high {
            Level::High
        } else {
            Level::Medium
        }
    }
}
