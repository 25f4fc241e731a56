pub mod book;
pub mod compact;
pub mod level;
pub mod pattern;
pub mod rank;
pub mod rate;
pub mod tariff;
