use thiserror::Error;

use crate::config::ParamsError;

/// Input rejected before the simulation loop starts. The loop itself has no
/// failure modes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("price series is empty")]
    EmptyPriceSeries,
    #[error("price at index {index} must be finite and positive, got {price}")]
    NonPositivePrice { index: usize, price: f64 },
    #[error("price dates must be strictly increasing; index {index} is out of order")]
    UnorderedDates { index: usize },
    #[error("invalid strategy parameters: {0}")]
    InvalidParams(#[from] ParamsError),
}
