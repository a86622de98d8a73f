//! 시장 데이터 제공자.

pub mod coingecko;

pub use coingecko::{CoinGeckoProvider, SnapshotProvider};
