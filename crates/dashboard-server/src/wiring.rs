use std::sync::Arc;

use axum::{routing::get, Router};
use runtime::market_data::{CachedPriceProvider, DataUnavailable, PriceProvider, YahooChartClient};
use runtime::BacktestRunner;
use tracing::info;

use crate::config::Config;

pub fn build_provider(config: &Config) -> Result<Arc<dyn PriceProvider>, DataUnavailable> {
    let client = YahooChartClient::new(config.yahoo_base_url.as_str())?;
    if config.cache_ttl.is_zero() {
        info!("price cache disabled");
        return Ok(Arc::new(client));
    }

    info!(ttl_secs = config.cache_ttl.as_secs(), "price cache enabled");
    Ok(Arc::new(CachedPriceProvider::new(client, config.cache_ttl)))
}

pub fn build_runner(config: &Config) -> Result<Arc<BacktestRunner>, DataUnavailable> {
    let provider = build_provider(config)?;
    Ok(Arc::new(BacktestRunner::new(
        provider,
        config.symbol.clone(),
        config.start_date,
        config.snapshot_output_path.clone(),
    )))
}

pub fn build_app(runner: Arc<BacktestRunner>) -> Router {
    api::app(runner).route("/health", get(healthcheck))
}

async fn healthcheck() -> &'static str {
    "ok"
}
