use core_sim::Snapshot;
use serde::Serialize;

/// Headline figures of a finished run, as shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub months: usize,
    pub capital: f64,
    pub final_total: f64,
    pub return_pct: f64,
    pub final_cash: f64,
    pub final_equity: f64,
    pub last_price: f64,
    pub dip_months: usize,
    pub peak_total: f64,
    pub max_drawdown_pct: f64,
}

impl RunSummary {
    pub fn from_snapshots(capital: f64, snapshots: &[Snapshot]) -> Option<Self> {
        let last = snapshots.last()?;

        let return_pct = if capital > 0.0 {
            (last.total / capital - 1.0) * 100.0
        } else {
            0.0
        };

        let (peak_total, max_drawdown_pct) = drawdown(snapshots);

        Some(Self {
            months: snapshots.len(),
            capital,
            final_total: last.total,
            return_pct,
            final_cash: last.cash,
            final_equity: last.equity,
            last_price: last.price,
            dip_months: snapshots.iter().filter(|snapshot| snapshot.dip).count(),
            peak_total,
            max_drawdown_pct,
        })
    }
}

/// Highest total value and deepest peak-to-trough fall of the total value
/// curve, in percent.
fn drawdown(snapshots: &[Snapshot]) -> (f64, f64) {
    let mut peak = f64::MIN;
    let mut max_drawdown = 0.0_f64;

    for snapshot in snapshots {
        peak = peak.max(snapshot.total);
        if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - snapshot.total) / peak * 100.0);
        }
    }

    (peak, max_drawdown)
}
