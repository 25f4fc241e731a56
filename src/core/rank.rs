use chrono::{DateTime, Local};
use itertools::Itertools;

use crate::quantity::rate::KilowattHourRate;

/// Rank every entry within its own local calendar day.
///
/// Entries of each day are stable-sorted by price and ranked by their position,
/// so that the cheapest slot gets `1` and the most expensive one gets `100`.
/// Ties keep their original order.
///
/// # Returns
///
/// Ranks indexed the same way as `entries`. An entry is [`None`] only if it never made it
/// into its day group.
#[must_use]
pub fn rank_by_day(entries: &[(DateTime<Local>, KilowattHourRate)]) -> Vec<Option<u8>> {
    let mut ranks = vec![None; entries.len()];
    let days = entries.iter().enumerate().into_group_map_by(|(_, (start, _))| start.date_naive());
    for mut day in days.into_values() {
        day.sort_by_key(|(_, (_, spot_price))| *spot_price);
        let n_entries = day.len();
        for (position, (index, _)) in day.into_iter().enumerate() {
            ranks[index] = Some(percentile(position, n_entries));
        }
    }
    ranks
}

/// `floor(position / (n - 1) * 99) + 1`, or `1` for a lone entry.
#[expect(clippy::cast_possible_truncation)]
const fn percentile(position: usize, n_entries: usize) -> u8 {
    if n_entries <= 1 { 1 } else { (position * 99 / (n_entries - 1)) as u8 + 1 }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use itertools::Itertools;

    use super::*;

    fn day(day: u32, prices: &[f64]) -> Vec<(DateTime<Local>, KilowattHourRate)> {
        let midnight = Local.with_ymd_and_hms(2025, 8, day, 0, 0, 0).unwrap();
        let step = TimeDelta::minutes(1440 / i64::try_from(prices.len()).unwrap());
        prices
            .iter()
            .zip(0..)
            .map(|(price, index)| (midnight + step * index, KilowattHourRate(*price)))
            .collect()
    }

    #[test]
    fn test_single_entry() {
        assert_eq!(rank_by_day(&day(9, &[0.3])), vec![Some(1)]);
    }

    #[test]
    fn test_spans_one_to_hundred() {
        let ranks = rank_by_day(&day(9, &[0.3, 0.1, 0.2]));
        assert_eq!(ranks, vec![Some(100), Some(1), Some(50)]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let ranks = rank_by_day(&day(9, &[0.2, 0.2, 0.1]));
        assert_eq!(ranks, vec![Some(50), Some(100), Some(1)]);
    }

    #[test]
    fn test_days_are_ranked_separately() {
        let mut entries = day(9, &[0.5, 0.4]);
        entries.extend(day(10, &[0.1, 0.2, 0.3]));
        let ranks = rank_by_day(&entries);
        assert_eq!(ranks, vec![Some(100), Some(1), Some(1), Some(50), Some(100)]);
    }

    #[test]
    fn test_full_day_ranks_are_distinct() {
        let prices = (0..24).map(|hour| f64::from((hour * 7) % 24)).collect_vec();
        let ranks = rank_by_day(&day(9, &prices)).into_iter().flatten().collect_vec();
        assert_eq!(ranks.len(), 24);
        assert_eq!(ranks.iter().unique().count(), 24);
        assert_eq!(ranks.iter().min(), Some(&1));
        assert_eq!(ranks.iter().max(), Some(&100));
    }

    #[test]
    fn test_quarter_hours() {
        let prices = (0..96).map(f64::from).collect_vec();
        let ranks = rank_by_day(&day(9, &prices)).into_iter().flatten().collect_vec();
        assert_eq!(ranks.iter().unique().count(), 96);
        assert_eq!(ranks.first(), Some(&1));
        assert_eq!(ranks.last(), Some(&100));
    }
}
