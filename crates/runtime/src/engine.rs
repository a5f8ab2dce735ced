use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use core_sim::{simulate, Snapshot, StrategyParams};
use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::BacktestError;
use crate::export::write_snapshot_file;
use crate::logging::{RunLogEvent, RunLogEventKind, RunLogWriter, TracingRunLogWriter};
use crate::market_data::{PriceProvider, PriceRequest};
use crate::metrics::RunSummary;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub run_id: u64,
    pub params: StrategyParams,
    pub snapshots: Vec<Snapshot>,
    pub summary: RunSummary,
}

/// Fetches prices, runs the strategy and persists the snapshot table.
pub struct BacktestRunner {
    provider: Arc<dyn PriceProvider>,
    symbol: String,
    start: Date,
    output_path: PathBuf,
    export_lock: Mutex<()>,
}

impl fmt::Debug for BacktestRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BacktestRunner")
            .field("symbol", &self.symbol)
            .field("start", &self.start)
            .field("output_path", &self.output_path)
            .finish_non_exhaustive()
    }
}

impl BacktestRunner {
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        symbol: impl Into<String>,
        start: Date,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            symbol: symbol.into(),
            start,
            output_path: output_path.into(),
            export_lock: Mutex::new(()),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Request covering the configured start date through today (UTC).
    pub fn price_request(&self) -> PriceRequest {
        let today = OffsetDateTime::now_utc().date();
        PriceRequest::new(self.symbol.clone(), self.start, today.max(self.start))
    }

    pub async fn run(
        &self,
        run_id: u64,
        params: StrategyParams,
    ) -> Result<BacktestReport, BacktestError> {
        let mut run_log = TracingRunLogWriter;
        self.run_with_log(run_id, params, &mut run_log).await
    }

    pub async fn run_with_log(
        &self,
        run_id: u64,
        params: StrategyParams,
        run_log: &mut dyn RunLogWriter,
    ) -> Result<BacktestReport, BacktestError> {
        let result = self.execute(run_id, params, run_log).await;
        if let Err(err) = &result {
            warn!(run_id, kind = err.kind(), error = %err, "backtest run failed");
        }
        result
    }

    async fn execute(
        &self,
        run_id: u64,
        params: StrategyParams,
        run_log: &mut dyn RunLogWriter,
    ) -> Result<BacktestReport, BacktestError> {
        params
            .validate()
            .map_err(core_sim::SimulationError::from)?;
        run_log.write(RunLogEvent::new(run_id, RunLogEventKind::RunStarted, None));

        let request = self.price_request();
        let prices = self.provider.monthly_closes(&request).await?;
        run_log.write(RunLogEvent::new(
            run_id,
            RunLogEventKind::PricesLoaded,
            Some(prices.len()),
        ));

        let snapshots = simulate(&params, &prices)?;
        run_log.write(RunLogEvent::new(
            run_id,
            RunLogEventKind::SimulationCompleted,
            Some(snapshots.len()),
        ));

        let summary = RunSummary::from_snapshots(params.capital, &snapshots)
            .ok_or(core_sim::SimulationError::EmptyPriceSeries)?;

        self.persist_snapshots(&snapshots).await?;
        run_log.write(RunLogEvent::new(
            run_id,
            RunLogEventKind::SnapshotWritten,
            Some(snapshots.len()),
        ));

        info!(
            run_id,
            symbol = %self.symbol,
            months = summary.months,
            final_total = summary.final_total,
            return_pct = summary.return_pct,
            final_cash = summary.final_cash,
            last_price = summary.last_price,
            "backtest run completed"
        );

        Ok(BacktestReport {
            run_id,
            params,
            snapshots,
            summary,
        })
    }

    /// Replaces the snapshot file off the async executor. Exports of this
    /// runner are applied one at a time, in lock order.
    async fn persist_snapshots(&self, snapshots: &[Snapshot]) -> Result<(), BacktestError> {
        let _export = self.export_lock.lock().await;
        let path = self.output_path.clone();
        let rows = snapshots.to_vec();

        tokio::task::spawn_blocking(move || write_snapshot_file(&path, &rows))
            .await
            .map_err(io::Error::other)??;
        Ok(())
    }
}
