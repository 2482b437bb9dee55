//! Market Data
//!
//! Typed clients for the external price and news providers the signal runner
//! consumes. Each price source implements [`EquityDataSource`] and tracks its
//! own health from request outcomes; reconciling observations across sources
//! is the engine's job, not this crate's.

pub mod health;
pub mod symbols;
pub mod types;
pub mod sources {
    pub mod alphavantage;
    pub mod news;
    pub mod yahoo;
}

pub use sources::alphavantage::AlphaVantageClient;
pub use sources::news::{HeadlineClient, NO_NEWS_SENTINEL};
pub use sources::yahoo::YahooFinanceClient;
pub use types::*;
