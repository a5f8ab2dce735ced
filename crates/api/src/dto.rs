use core_sim::{Snapshot, StrategyParams};
use runtime::{BacktestReport, RunSummary};
use serde::{Deserialize, Serialize};

/// Control panel input. Rates are percentages; missing fields fall back to
/// the strategy defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestRequest {
    pub capital: Option<f64>,
    pub dip_trigger_pct: Option<f64>,
    pub dip_multiplier: Option<u32>,
    pub profit_take_pct: Option<f64>,
    pub cash_yield_apr_pct: Option<f64>,
    pub equity_target_pct: Option<f64>,
}

impl BacktestRequest {
    pub fn into_params(self) -> StrategyParams {
        let defaults = StrategyParams::default();

        StrategyParams {
            capital: self.capital.unwrap_or(defaults.capital),
            dip_trigger: self
                .dip_trigger_pct
                .map_or(defaults.dip_trigger, pct_to_fraction),
            dip_multiplier: self.dip_multiplier.unwrap_or(defaults.dip_multiplier),
            profit_take: self
                .profit_take_pct
                .map_or(defaults.profit_take, pct_to_fraction),
            cash_yield_apr: self
                .cash_yield_apr_pct
                .map_or(defaults.cash_yield_apr, pct_to_fraction),
            equity_target: self
                .equity_target_pct
                .map(pct_to_fraction)
                .or(defaults.equity_target),
        }
    }
}

fn pct_to_fraction(pct: f64) -> f64 {
    pct / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamsView {
    pub capital: f64,
    pub dip_trigger_pct: f64,
    pub dip_multiplier: u32,
    /// `None` when profit-taking is disabled.
    pub profit_take_pct: Option<f64>,
    pub cash_yield_apr_pct: f64,
    pub equity_target_pct: Option<f64>,
}

impl From<&StrategyParams> for ParamsView {
    fn from(params: &StrategyParams) -> Self {
        Self {
            capital: params.capital,
            dip_trigger_pct: params.dip_trigger * 100.0,
            dip_multiplier: params.dip_multiplier,
            profit_take_pct: Some(params.profit_take)
                .filter(|threshold| threshold.is_finite())
                .map(|threshold| threshold * 100.0),
            cash_yield_apr_pct: params.cash_yield_apr * 100.0,
            equity_target_pct: params.equity_target.map(|target| target * 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotView {
    pub date: String,
    pub price: f64,
    pub total: f64,
    pub cash: f64,
    pub equity: f64,
    pub dip: bool,
}

impl From<&Snapshot> for SnapshotView {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            date: snapshot.date.to_string(),
            price: snapshot.price,
            total: snapshot.total,
            cash: snapshot.cash,
            equity: snapshot.equity,
            dip: snapshot.dip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResponse {
    pub run_id: u64,
    pub symbol: String,
    pub params: ParamsView,
    pub summary: RunSummary,
    pub snapshots: Vec<SnapshotView>,
}

impl RunResponse {
    pub fn from_report(symbol: impl Into<String>, report: &BacktestReport) -> Self {
        Self {
            run_id: report.run_id,
            symbol: symbol.into(),
            params: ParamsView::from(&report.params),
            summary: report.summary.clone(),
            snapshots: report.snapshots.iter().map(SnapshotView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}
