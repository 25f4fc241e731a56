use chrono::{DateTime, Days, Local, NaiveDate, TimeDelta};
use clap::Parser;
use serde::Serialize;

use crate::{
    cli::{nord_pool::NordPoolArgs, pattern::PatternArgs, tariff::TariffArgs},
    core::{
        book::{RateBook, Snapshot},
        compact::{CompactLevels, LevelStrip},
        pattern::Resampler,
    },
    prelude::*,
    scheduler::{FetchOutcome, FetchStatus, fetch},
    tables::build_rates_table,
};

#[derive(Parser)]
pub struct RatesArgs {
    #[clap(flatten)]
    pub nord_pool: NordPoolArgs,

    #[clap(flatten)]
    pub tariff: TariffArgs,

    #[clap(flatten)]
    pub pattern: PatternArgs,

    /// Print the report as JSON instead of the table.
    #[clap(long)]
    pub json: bool,
}

#[instrument(skip_all)]
pub async fn rates(args: &RatesArgs) -> Result {
    let api = args.nord_pool.api()?;
    let now = Local::now();
    let today = now.date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).context("the date is out of range")?;

    let mut currency = None;
    let mut raw = Vec::new();
    let mut fetches = Vec::new();
    for on in [today, tomorrow] {
        let outcome = fetch(&api, on).await;
        let status = outcome.status();
        fetches.push(DayFetch { date: on, status });
        match outcome {
            FetchOutcome::Data { currency: day_currency, raw: day_raw } => {
                currency = currency.or(day_currency);
                raw.extend(day_raw);
            }
            _ if on == today => bail!("no prices for today: {status}"),
            _ => warn!(%on, %status, "no prices for tomorrow"),
        }
    }

    let mut book = RateBook::new(args.tariff.fees());
    book.update(currency, &raw);
    let report = Report::new(
        &mut book,
        now,
        args.pattern.strip_step()?,
        args.pattern.fill_unknown,
        args.pattern.resampler()?,
        fetches,
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", build_rates_table(book.rates(), now));
    info!(
        level = %report.snapshot.level,
        rank = %report.snapshot.rank,
        cost = %report.snapshot.cost,
        currency = ?report.snapshot.currency,
        "current",
    );
    info!(current = %report.current_level, compact = %report.compact, "levels");
    info!(pattern = %report.pattern, "pattern");
    Ok(())
}

#[derive(Serialize)]
struct DayFetch {
    date: NaiveDate,
    status: FetchStatus,
}

/// Everything known about the rates at the given instant.
#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    snapshot: Snapshot,

    levels: LevelStrip,
    current_level: char,
    compact: CompactLevels,
    pattern: String,
    fetches: Vec<DayFetch>,
}

impl Report {
    fn new(
        book: &mut RateBook,
        now: DateTime<Local>,
        strip_step: TimeDelta,
        fill_unknown: bool,
        resampler: Resampler,
        fetches: Vec<DayFetch>,
    ) -> Self {
        let snapshot = book.current(now);
        let levels = LevelStrip::new(book.rates(), book.thresholds(), now, strip_step, fill_unknown);
        Self {
            current_level: levels.current_level(now),
            compact: CompactLevels::new(&levels, now),
            pattern: resampler.pattern(book.rates()),
            snapshot,
            levels,
            fetches,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        core::{rate::RawPriceEntry, tariff::FeeConfiguration},
        quantity::rate::MegawattHourRate,
    };

    #[test]
    fn test_report() -> Result {
        let now = Local.with_ymd_and_hms(2025, 8, 9, 10, 30, 0).unwrap();
        let raw: Vec<RawPriceEntry> = (0..24)
            .map(|hour| {
                let start = Local.with_ymd_and_hms(2025, 8, 9, hour, 0, 0).unwrap().fixed_offset();
                RawPriceEntry {
                    start,
                    end: start + TimeDelta::hours(1),
                    price: Some(MegawattHourRate(10.0 * f64::from(hour))),
                }
            })
            .collect();
        let mut book = RateBook::new(FeeConfiguration::default());
        book.update(Some("EUR".to_string()), &raw);

        let fetches = vec![DayFetch { date: now.date_naive(), status: FetchStatus::SuccessData }];
        let report = Report::new(&mut book, now, TimeDelta::zero(), false, Resampler::default(), fetches);
        assert_eq!(report.current_level, 'M');
        assert_eq!(report.compact.to_string(), "630:60:M:MMMMMMMMMMMM");

        let value = serde_json::to_value(&report)?;
        assert_eq!(value["level"], "Medium");
        assert_eq!(value["unit_of_measurement"], "EUR/kWh");
        assert_eq!(value["levels"]["step_minutes"], 60);
        assert_eq!(value["levels"]["levels"], "M".repeat(24));
        assert_eq!(value["compact"], "630:60:M:MMMMMMMMMMMM");
        assert_eq!(value["pattern"].as_str().map(str::len), Some(180));
        assert_eq!(value["fetches"][0]["status"], "SUCCESS_DATA");
        Ok(())
    }
}
