quantity!(
    /// Whole-number percentage, so `25` means a quarter.
    Percent, suffix: "%", precision: 1
);

impl Percent {
    #[must_use]
    pub fn fraction(self) -> f64 {
        self.0 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_fraction() {
        assert_abs_diff_eq!(Percent(25.0).fraction(), 0.25);
        assert_abs_diff_eq!(Percent::ZERO.fraction(), 0.0);
    }
}
