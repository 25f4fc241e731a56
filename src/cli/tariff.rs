//! Fees, taxes and level thresholds.

use clap::Parser;

use crate::{
    core::tariff::{FeeConfiguration, Thresholds},
    quantity::{percent::Percent, rate::KilowattHourRate},
};

#[derive(Parser)]
pub struct TariffArgs {
    #[clap(long, env = "SUPPLIER_FIXED_FEE", default_value = "0")]
    pub supplier_fixed_fee: KilowattHourRate,

    /// Percentage of the spot price.
    #[clap(long, env = "SUPPLIER_VARIABLE_FEE", default_value = "0")]
    pub supplier_variable_fee: Percent,

    #[clap(long, env = "SUPPLIER_FIXED_CREDIT", default_value = "0")]
    pub supplier_fixed_credit: KilowattHourRate,

    /// Percentage of the spot price.
    #[clap(long, env = "SUPPLIER_VARIABLE_CREDIT", default_value = "0")]
    pub supplier_variable_credit: Percent,

    #[clap(long, env = "GRID_FIXED_FEE", default_value = "0")]
    pub grid_fixed_fee: KilowattHourRate,

    /// Percentage of the spot price.
    #[clap(long, env = "GRID_VARIABLE_FEE", default_value = "0")]
    pub grid_variable_fee: Percent,

    #[clap(long, env = "GRID_FIXED_CREDIT", default_value = "0")]
    pub grid_fixed_credit: KilowattHourRate,

    /// Percentage of the spot price.
    #[clap(long, env = "GRID_VARIABLE_CREDIT", default_value = "0")]
    pub grid_variable_credit: Percent,

    /// Energy tax per kilowatt-hour.
    #[clap(long = "grid-energy-tax", env = "GRID_ENERGY_TAX", default_value = "0")]
    pub energy_tax: KilowattHourRate,

    #[clap(long = "electricity-vat", env = "ELECTRICITY_VAT", default_value = "0")]
    pub vat: Percent,

    /// Costs below this one are low. Without it, nothing is low.
    #[clap(long, env = "LOW_THRESHOLD")]
    pub low_threshold: Option<KilowattHourRate>,

    /// Costs above this one are high. Without it, nothing is high.
    #[clap(long, env = "HIGH_THRESHOLD")]
    pub high_threshold: Option<KilowattHourRate>,
}

impl TariffArgs {
    pub fn fees(&self) -> FeeConfiguration {
        FeeConfiguration::builder()
            .supplier_fixed_fee(self.supplier_fixed_fee)
            .supplier_variable_fee(self.supplier_variable_fee)
            .supplier_fixed_credit(self.supplier_fixed_credit)
            .supplier_variable_credit(self.supplier_variable_credit)
            .grid_fixed_fee(self.grid_fixed_fee)
            .grid_variable_fee(self.grid_variable_fee)
            .grid_fixed_credit(self.grid_fixed_credit)
            .grid_variable_credit(self.grid_variable_credit)
            .energy_tax(self.energy_tax)
            .vat(self.vat)
            .thresholds(Thresholds::new(self.low_threshold, self.high_threshold))
            .build()
    }
}
