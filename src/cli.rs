mod nord_pool;
mod pattern;
mod rates;
mod schedule;
mod tariff;
mod watch;

use clap::{Parser, Subcommand};

pub use self::{
    rates::{RatesArgs, rates},
    watch::{WatchArgs, watch},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: keep today's and tomorrow's prices up to date and report the current level.
    #[clap(name = "watch")]
    Watch(Box<WatchArgs>),

    /// Fetch today's and tomorrow's prices once and print the rates.
    #[clap(name = "rates")]
    Rates(Box<RatesArgs>),
}
