use chrono::{DateTime, Local, TimeDelta};
use clap::Parser;
use tokio::{sync::watch, time::sleep};

use crate::{
    cli::{
        nord_pool::NordPoolArgs,
        pattern::PatternArgs,
        schedule::ScheduleArgs,
        tariff::TariffArgs,
    },
    core::{
        book::{RateBook, Snapshot},
        compact::{CompactLevels, LevelStrip},
        rate::RawPriceEntry,
    },
    prelude::*,
    scheduler::{Handle, PriceConsumer, Scheduler},
};

#[derive(Parser)]
pub struct WatchArgs {
    #[clap(flatten)]
    pub nord_pool: NordPoolArgs,

    #[clap(flatten)]
    pub tariff: TariffArgs,

    #[clap(flatten)]
    pub schedule: ScheduleArgs,

    #[clap(flatten)]
    pub pattern: PatternArgs,
}

type Delivery = (Option<String>, Vec<RawPriceEntry>);

/// Hands the scheduler deliveries over to the reporting loop.
struct Channel(watch::Sender<Option<Delivery>>);

impl PriceConsumer for Channel {
    fn update(&mut self, currency: Option<String>, raw: Vec<RawPriceEntry>) {
        self.0.send_replace(Some((currency, raw)));
    }
}

#[instrument(skip_all)]
pub async fn watch(args: &WatchArgs) -> Result {
    let resampler = args.pattern.resampler()?;
    let strip_step = args.pattern.strip_step()?;
    let mut book = RateBook::new(args.tariff.fees());

    let (sender, mut deliveries) = watch::channel(None);
    let handle = Scheduler::builder()
        .service(args.nord_pool.api()?)
        .consumer(Channel(sender))
        .policy(args.schedule.policy())
        .build()
        .start();

    loop {
        let now = Local::now();
        let snapshot = book.current(now);
        let strip = LevelStrip::new(
            book.rates(),
            book.thresholds(),
            now,
            strip_step,
            args.pattern.fill_unknown,
        );
        report(&snapshot, &strip, &resampler.pattern(book.rates()), &handle, now);
        let delay = strip.next_update(now).max(TimeDelta::milliseconds(1)).to_std()?;

        tokio::select! {
            result = deliveries.changed() => {
                if result.is_err() {
                    warn!("the scheduler has gone");
                    break;
                }
                let delivery = deliveries.borrow_and_update().clone();
                if let Some((currency, raw)) = delivery {
                    book.update(currency, &raw);
                }
            }
            () = sleep(delay) => {}
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for the interrupt")?;
                info!("interrupted");
                break;
            }
        }
    }

    handle.stop();
    handle.join().await
}

fn report(
    snapshot: &Snapshot,
    strip: &LevelStrip,
    pattern: &str,
    handle: &Handle,
    now: DateTime<Local>,
) {
    let status = handle.status();
    info!(
        level = %snapshot.level,
        rank = %snapshot.rank,
        cost = %snapshot.cost,
        currency = ?snapshot.currency,
        n_rates = snapshot.rates.len(),
        phase = %status.phase,
        last_fetch = ?status.last_fetch,
        "current",
    );
    info!(
        current = %strip.current_level(now),
        compact = %CompactLevels::new(strip, now),
        %pattern,
        "levels",
    );
}
