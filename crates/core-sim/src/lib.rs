mod config;
mod error;
mod generators;
mod series;
mod simulator;
mod snapshot;
mod state;

pub use config::{
    ParamsError, StrategyParams, DEFAULT_CAPITAL, DEFAULT_CASH_YIELD_APR, DEFAULT_DIP_MULTIPLIER,
    DEFAULT_DIP_TRIGGER, DEFAULT_EQUITY_TARGET, DEFAULT_PROFIT_TAKE,
};
pub use error::SimulationError;
pub use generators::MonthlySeriesGenerator;
pub use series::{validate_series, PricePoint};
pub use simulator::{simulate, Simulator, StepOutcome, StepTrace};
pub use snapshot::Snapshot;
pub use state::PortfolioState;
