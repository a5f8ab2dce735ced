use thiserror::Error;

pub const DEFAULT_CAPITAL: f64 = 50_000.0;
pub const DEFAULT_DIP_TRIGGER: f64 = 0.03;
pub const DEFAULT_DIP_MULTIPLIER: u32 = 3;
pub const DEFAULT_PROFIT_TAKE: f64 = 0.08;
pub const DEFAULT_CASH_YIELD_APR: f64 = 0.05;
pub const DEFAULT_EQUITY_TARGET: f64 = 0.8;

/// Parameters of a single backtest run. All rates are fractions, not
/// percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    pub capital: f64,
    pub dip_trigger: f64,
    pub dip_multiplier: u32,
    /// Unrealized gain above which the surplus is sold. `f64::INFINITY`
    /// disables profit-taking.
    pub profit_take: f64,
    /// Annual yield on idle cash, compounded monthly.
    pub cash_yield_apr: f64,
    /// Equity share of total value the rebalance step aims for. `None`
    /// skips rebalancing.
    pub equity_target: Option<f64>,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            capital: DEFAULT_CAPITAL,
            dip_trigger: DEFAULT_DIP_TRIGGER,
            dip_multiplier: DEFAULT_DIP_MULTIPLIER,
            profit_take: DEFAULT_PROFIT_TAKE,
            cash_yield_apr: DEFAULT_CASH_YIELD_APR,
            equity_target: Some(DEFAULT_EQUITY_TARGET),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ParamsError {
    #[error("capital must be finite and positive, got {0}")]
    InvalidCapital(f64),
    #[error("dip trigger must be finite and non-negative, got {0}")]
    InvalidDipTrigger(f64),
    #[error("dip multiplier must be at least 1, got {0}")]
    InvalidDipMultiplier(u32),
    #[error("profit-take threshold must be non-negative, got {0}")]
    InvalidProfitTake(f64),
    #[error("cash yield must be finite and above -1200%, got {0}")]
    InvalidCashYield(f64),
    #[error("equity target must be within (0, 1], got {0}")]
    InvalidEquityTarget(f64),
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !self.capital.is_finite() || self.capital <= 0.0 {
            return Err(ParamsError::InvalidCapital(self.capital));
        }
        if !self.dip_trigger.is_finite() || self.dip_trigger < 0.0 {
            return Err(ParamsError::InvalidDipTrigger(self.dip_trigger));
        }
        if self.dip_multiplier < 1 {
            return Err(ParamsError::InvalidDipMultiplier(self.dip_multiplier));
        }
        if self.profit_take.is_nan() || self.profit_take < 0.0 {
            return Err(ParamsError::InvalidProfitTake(self.profit_take));
        }
        if !self.cash_yield_apr.is_finite() || self.monthly_yield_factor() <= 0.0 {
            return Err(ParamsError::InvalidCashYield(self.cash_yield_apr));
        }
        if let Some(target) = self.equity_target {
            if !target.is_finite() || target <= 0.0 || target > 1.0 {
                return Err(ParamsError::InvalidEquityTarget(target));
            }
        }

        Ok(())
    }

    pub fn monthly_yield_factor(&self) -> f64 {
        1.0 + self.cash_yield_apr / 12.0
    }
}
