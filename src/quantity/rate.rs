quantity!(
    /// Price per kilowatt-hour in the main currency unit.
    KilowattHourRate, suffix: "/kWh", precision: 5
);

quantity!(
    /// Price per megawatt-hour, the unit day-ahead markets publish in.
    MegawattHourRate, suffix: "/MWh", precision: 2
);

impl KilowattHourRate {
    /// Round to 5 decimal places, the precision of the published costs.
    ///
    /// Rounds the exact binary value, so `0.139375` stored slightly below the tie goes down.
    #[must_use]
    pub fn round(self) -> Self {
        format!("{:.5}", self.0).parse().map_or(self, Self)
    }
}

impl From<MegawattHourRate> for KilowattHourRate {
    fn from(rate: MegawattHourRate) -> Self {
        Self(rate.0 / 1000.0)
    }
}
