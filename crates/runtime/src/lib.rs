pub mod engine;
pub mod error;
pub mod export;
pub mod logging;
pub mod market_data;
pub mod metrics;

pub use engine::{BacktestReport, BacktestRunner};
pub use error::BacktestError;
pub use metrics::RunSummary;
