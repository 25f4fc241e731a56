use chrono::{DateTime, FixedOffset, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        level::{Level, Rank},
        rank::rank_by_day,
        tariff::FeeConfiguration,
    },
    ops::Interval,
    prelude::*,
    quantity::rate::{KilowattHourRate, MegawattHourRate},
};

/// Spot price of a single slot as published by the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawPriceEntry {
    pub start: DateTime<FixedOffset>,

    /// Exclusive.
    pub end: DateTime<FixedOffset>,

    /// Slots without a published price are skipped.
    #[serde(alias = "value")]
    pub price: Option<MegawattHourRate>,
}

/// Fully costed and classified slot.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct RateRecord {
    #[serde(flatten)]
    pub interval: Interval,

    pub spot_price: KilowattHourRate,
    pub cost: KilowattHourRate,
    pub credit: KilowattHourRate,
    pub level: Level,
    pub rank: Rank,
}

/// Turn the raw curve into rate records sorted by start time.
///
/// The whole batch fails if any entry has a non-finite price or an empty interval.
#[instrument(skip_all, fields(n_entries = raw.len()))]
pub fn compute_rates(raw: &[RawPriceEntry], fees: &FeeConfiguration) -> Result<Vec<RateRecord>> {
    let slots: Vec<(Interval, KilowattHourRate)> = raw
        .iter()
        .filter_map(|entry| {
            if entry.price.is_none() {
                debug!(%entry.start, "skipping the entry without a price");
            }
            Some((entry, entry.price?))
        })
        .map(|(entry, price)| {
            ensure!(price.0.is_finite(), "invalid price `{}` at {}", price.0, entry.start);
            let interval =
                Interval::new(entry.start.with_timezone(&Local), entry.end.with_timezone(&Local));
            ensure!(interval.start < interval.end, "invalid interval {interval:?}");
            Ok((interval, KilowattHourRate::from(price)))
        })
        .collect::<Result<_>>()?;

    let ranks = rank_by_day(
        &slots.iter().map(|(interval, spot_price)| (interval.start, *spot_price)).collect_vec(),
    );

    let mut records = slots
        .into_iter()
        .zip(ranks)
        .map(|((interval, spot_price), rank)| {
            let cost = fees.cost(spot_price);
            let rank = rank.map_or_else(
                || {
                    warn!(?interval, %spot_price, "could not determine the rank");
                    Rank::NotAvailable
                },
                Rank::Percentile,
            );
            RateRecord {
                interval,
                spot_price,
                cost,
                credit: fees.credit(spot_price),
                level: fees.thresholds.level(cost),
                rank,
            }
        })
        .collect_vec();
    records.sort_by_key(|record| record.interval.start);

    debug!(n_records = records.len(), "computed the rates");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::core::tariff::Thresholds;

    fn entry(day: u32, hour: u32, price: Option<f64>) -> RawPriceEntry {
        let start = Local.with_ymd_and_hms(2025, 8, day, hour, 0, 0).unwrap().fixed_offset();
        RawPriceEntry { start, end: start + TimeDelta::hours(1), price: price.map(MegawattHourRate) }
    }

    fn fees() -> FeeConfiguration {
        FeeConfiguration::builder()
            .thresholds(Thresholds::new(Some(KilowattHourRate(0.05)), Some(KilowattHourRate(0.1))))
            .build()
    }

    #[test]
    fn test_compute_rates() -> Result {
        let raw = vec![entry(9, 1, Some(120.0)), entry(9, 0, Some(30.0)), entry(9, 2, Some(75.0))];
        let records = compute_rates(&raw, &fees())?;

        assert_eq!(records.len(), 3);
        assert!(records.is_sorted_by_key(|record| record.interval.start));
        assert!(records.iter().all(|record| record.interval.start < record.interval.end));

        assert_abs_diff_eq!(records[0].spot_price.0, 0.03);
        assert_eq!(records[0].level, Level::Low);
        assert_eq!(records[0].rank, Rank::Percentile(1));

        assert_eq!(records[1].level, Level::High);
        assert_eq!(records[1].rank, Rank::Percentile(100));

        assert_eq!(records[2].level, Level::Medium);
        assert_eq!(records[2].rank, Rank::Percentile(50));
        Ok(())
    }

    #[test]
    fn test_end_is_converted_to_local_time() -> Result {
        let start = DateTime::parse_from_rfc3339("2025-08-09T10:00:00+00:00")?;
        let raw = vec![RawPriceEntry {
            start,
            end: DateTime::parse_from_rfc3339("2025-08-09T11:00:00+00:00")?,
            price: Some(MegawattHourRate(10.0)),
        }];
        let records = compute_rates(&raw, &fees())?;
        assert_eq!(records[0].interval.start, start.with_timezone(&Local));
        assert_eq!(records[0].interval.len(), TimeDelta::hours(1));
        Ok(())
    }

    #[test]
    fn test_entries_without_price_are_skipped() -> Result {
        let raw = vec![entry(9, 0, Some(30.0)), entry(9, 1, None)];
        assert_eq!(compute_rates(&raw, &fees())?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_empty_curve() -> Result {
        assert!(compute_rates(&[], &fees())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_inverted_interval_fails_the_batch() {
        let mut bad = entry(9, 1, Some(30.0));
        bad.end = bad.start - TimeDelta::hours(1);
        assert!(compute_rates(&[entry(9, 0, Some(30.0)), bad], &fees()).is_err());
    }

    #[test]
    fn test_non_finite_price_fails_the_batch() {
        assert!(compute_rates(&[entry(9, 0, Some(f64::NAN))], &fees()).is_err());
    }

    #[test]
    fn test_ranks_are_per_day() -> Result {
        let raw = vec![entry(9, 23, Some(10.0)), entry(10, 0, Some(50.0))];
        let records = compute_rates(&raw, &fees())?;
        assert!(records.iter().all(|record| record.rank == Rank::Percentile(1)));
        Ok(())
    }

    #[test]
    fn test_deserialize_raw_entry() -> Result {
        let entry: RawPriceEntry = serde_json::from_str(
            r#"{"start": "2025-08-09T00:00:00+02:00", "end": "2025-08-09T01:00:00+02:00", "value": 10.5}"#,
        )?;
        assert_eq!(entry.price, Some(MegawattHourRate(10.5)));
        let entry: RawPriceEntry = serde_json::from_str(
            r#"{"start": "2025-08-09T00:00:00Z", "end": "2025-08-09T01:00:00Z", "price": null}"#,
        )?;
        assert_eq!(entry.price, None);
        Ok(())
    }
}
