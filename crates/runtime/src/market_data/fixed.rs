use async_trait::async_trait;
use core_sim::PricePoint;

use super::{DataUnavailable, PriceProvider, PriceRequest};

/// Serves the same in-memory series for every request.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceProvider {
    points: Vec<PricePoint>,
}

impl StaticPriceProvider {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }
}

#[async_trait]
impl PriceProvider for StaticPriceProvider {
    async fn monthly_closes(
        &self,
        _request: &PriceRequest,
    ) -> Result<Vec<PricePoint>, DataUnavailable> {
        Ok(self.points.clone())
    }
}
