use time::Date;

use crate::error::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: Date,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: Date, close: f64) -> Self {
        Self { date, close }
    }
}

/// Checks that `points` is a non-empty, strictly chronological series of
/// finite positive closes.
pub fn validate_series(points: &[PricePoint]) -> Result<(), SimulationError> {
    if points.is_empty() {
        return Err(SimulationError::EmptyPriceSeries);
    }

    for (index, point) in points.iter().enumerate() {
        if !point.close.is_finite() || point.close <= 0.0 {
            return Err(SimulationError::NonPositivePrice {
                index,
                price: point.close,
            });
        }
    }

    if let Some(index) = points
        .windows(2)
        .position(|pair| pair[1].date <= pair[0].date)
    {
        return Err(SimulationError::UnorderedDates { index: index + 1 });
    }

    Ok(())
}
