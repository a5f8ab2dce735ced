pub mod cache;
pub mod fixed;
pub mod yahoo;

use async_trait::async_trait;
use core_sim::PricePoint;
use thiserror::Error;
use time::Date;

pub use cache::CachedPriceProvider;
pub use fixed::StaticPriceProvider;
pub use yahoo::{parse_chart_payload, YahooChartClient, DEFAULT_YAHOO_BASE_URL};

/// Monthly closes for `symbol` between `start` and `end`, both inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceRequest {
    pub symbol: String,
    pub start: Date,
    pub end: Date,
}

impl PriceRequest {
    pub fn new(symbol: impl Into<String>, start: Date, end: Date) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUnavailable {
    #[error("market data request failed: {0}")]
    Transport(String),
    #[error("market data provider answered with HTTP {0}")]
    Status(u16),
    #[error("market data payload could not be decoded: {0}")]
    Decode(String),
    #[error("market data provider reported {code}: {description}")]
    Provider { code: String, description: String },
    #[error("no usable monthly closes for {symbol}")]
    NoRows { symbol: String },
}

/// Source of the price series fed to the simulator.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn monthly_closes(&self, request: &PriceRequest)
        -> Result<Vec<PricePoint>, DataUnavailable>;
}
