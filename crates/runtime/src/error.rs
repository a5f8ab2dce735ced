use std::io;

use core_sim::SimulationError;
use thiserror::Error;

use crate::market_data::DataUnavailable;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("invalid backtest input: {0}")]
    Input(#[from] SimulationError),
    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailable),
    #[error("failed to write snapshot table: {0}")]
    Export(#[from] io::Error),
}

impl BacktestError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Input(_) => "input_error",
            Self::DataUnavailable(_) => "data_unavailable",
            Self::Export(_) => "export_failed",
        }
    }
}
