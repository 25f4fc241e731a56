use chrono::{DateTime, Local};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{level::Level, rate::RateRecord};

pub fn build_rates_table(rates: &[RateRecord], now: DateTime<Local>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Date", "Start", "End", "Spot", "Cost", "Credit", "Level", "Rank"]);
    for rate in rates {
        let mut start = Cell::new(rate.interval.start.format("%H:%M"));
        if rate.interval.contains(now) {
            start = start.add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            Cell::new(rate.interval.start.format("%b %d")).add_attribute(Attribute::Dim),
            start,
            Cell::new(rate.interval.end.format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(rate.spot_price).set_alignment(CellAlignment::Right),
            Cell::new(rate.cost).set_alignment(CellAlignment::Right).fg(level_color(rate.level)),
            Cell::new(rate.credit).set_alignment(CellAlignment::Right),
            Cell::new(rate.level).fg(level_color(rate.level)),
            Cell::new(rate.rank).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

const fn level_color(level: Level) -> Color {
    match level {
        Level::Low => Color::Green,
        Level::Medium => Color::DarkYellow,
        Level::High => Color::Red,
        Level::Unknown | Level::ErrorProcessingData => Color::Reset,
    }
}
