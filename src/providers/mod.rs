pub mod coingecko;
pub mod restdb;
