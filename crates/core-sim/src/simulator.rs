use strategy::{
    capped_buy, emit_signal, rebalance, size_for_signal, take_profit, BuySignal, Rebalance,
    SizingConfig,
};
use tracing::trace;

use crate::config::StrategyParams;
use crate::error::SimulationError;
use crate::series::{validate_series, PricePoint};
use crate::snapshot::Snapshot;
use crate::state::PortfolioState;

/// Amounts moved during one month, in the order they were applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepTrace {
    pub yield_accrued: f64,
    pub dca_buy: f64,
    pub profit_taken: f64,
    /// Positive for a rebalance buy, negative for a sell.
    pub rebalance_trade: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub state: PortfolioState,
    pub snapshot: Snapshot,
    pub trace: StepTrace,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simulator {
    params: StrategyParams,
    sizing: SizingConfig,
}

impl Simulator {
    /// Prepares a run of `months` purchases. Fails on invalid parameters or
    /// an empty schedule.
    pub fn new(params: StrategyParams, months: usize) -> Result<Self, SimulationError> {
        params.validate()?;
        if months == 0 {
            return Err(SimulationError::EmptyPriceSeries);
        }

        Ok(Self {
            params,
            sizing: SizingConfig::new(params.capital, months, params.dip_multiplier),
        })
    }

    pub fn base_allocation(&self) -> f64 {
        self.sizing.base_allocation()
    }

    pub fn initial_state(&self) -> PortfolioState {
        PortfolioState::new(self.params.capital)
    }

    /// Advances `state` by one month at `point`.
    ///
    /// Order: cash yield, dip check, DCA buy, profit-take, rebalance. Every
    /// trade is a transfer between cash and equity at `point.close`, so total
    /// value only changes by the yield accrued.
    pub fn step(
        &self,
        state: PortfolioState,
        point: &PricePoint,
        previous_close: Option<f64>,
    ) -> StepOutcome {
        let price = point.close;
        let mut next = state;
        let mut trace = StepTrace::default();

        let grown = next.cash * self.params.monthly_yield_factor();
        trace.yield_accrued = grown - next.cash;
        next.cash = grown;

        let signal = emit_signal(previous_close, price, self.params.dip_trigger);
        let dip = signal == BuySignal::Dip;

        let buy = capped_buy(size_for_signal(signal, self.sizing), next.cash);
        next.shares += buy / price;
        next.cash -= buy;
        next.invested_basis += buy;
        trace.dca_buy = buy;

        if let Some(take) = take_profit(
            next.shares,
            price,
            next.invested_basis,
            self.params.profit_take,
        ) {
            next.shares -= take.shares_sold;
            next.cash += take.proceeds;
            next.invested_basis = take.remaining_basis;
            trace.profit_taken = take.proceeds;
        }

        if let Some(target) = self.params.equity_target {
            match rebalance(next.cash, next.shares, next.invested_basis, price, target) {
                Rebalance::Buy { amount, shares } => {
                    next.shares += shares;
                    next.cash -= amount;
                    next.invested_basis += amount;
                    trace.rebalance_trade = amount;
                }
                Rebalance::Sell {
                    amount,
                    shares,
                    remaining_basis,
                } => {
                    next.shares -= shares;
                    next.cash += amount;
                    next.invested_basis = remaining_basis;
                    trace.rebalance_trade = -amount;
                }
                Rebalance::Hold => {}
            }
        }

        let equity = next.equity(price);
        let snapshot = Snapshot {
            date: point.date,
            price,
            total: next.cash + equity,
            cash: next.cash,
            equity,
            dip,
        };

        trace!(
            date = %point.date,
            price,
            dip,
            yield_accrued = trace.yield_accrued,
            dca_buy = trace.dca_buy,
            profit_taken = trace.profit_taken,
            rebalance_trade = trace.rebalance_trade,
            total = snapshot.total,
            "simulated month"
        );

        StepOutcome {
            state: next,
            snapshot,
            trace,
        }
    }

    /// Folds [`Simulator::step`] over `prices`, one snapshot per month.
    pub fn run(&self, prices: &[PricePoint]) -> Vec<Snapshot> {
        let mut state = self.initial_state();
        let mut previous_close = None;
        let mut snapshots = Vec::with_capacity(prices.len());

        for point in prices {
            let outcome = self.step(state, point, previous_close);
            state = outcome.state;
            previous_close = Some(point.close);
            snapshots.push(outcome.snapshot);
        }

        snapshots
    }
}

/// Validates the inputs and runs the strategy over the whole series.
pub fn simulate(
    params: &StrategyParams,
    prices: &[PricePoint],
) -> Result<Vec<Snapshot>, SimulationError> {
    validate_series(prices)?;
    let simulator = Simulator::new(*params, prices.len())?;
    Ok(simulator.run(prices))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use time::{macros::date, Date, Month};

    use super::{simulate, Simulator};
    use crate::config::StrategyParams;
    use crate::error::SimulationError;
    use crate::series::PricePoint;

    const TOLERANCE: f64 = 1e-6;

    fn monthly_series(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(index, close)| {
                let year = 2015 + (index / 12) as i32;
                let month = Month::try_from((index % 12) as u8 + 1).unwrap();
                let date = Date::from_calendar_date(year, month, 1).unwrap();
                PricePoint::new(date, *close)
            })
            .collect()
    }

    fn plain_dca(capital: f64) -> StrategyParams {
        StrategyParams {
            capital,
            dip_trigger: 0.03,
            dip_multiplier: 1,
            profit_take: f64::INFINITY,
            cash_yield_apr: 0.0,
            equity_target: None,
        }
    }

    fn fixture_params() -> StrategyParams {
        StrategyParams {
            capital: 12_000.0,
            dip_trigger: 0.03,
            dip_multiplier: 2,
            profit_take: 0.08,
            cash_yield_apr: 0.0,
            equity_target: Some(0.8),
        }
    }

    #[test]
    fn flat_year_fixture_settles_at_eighty_twenty() {
        let prices = monthly_series(&[100.0; 12]);

        let snapshots = simulate(&fixture_params(), &prices).unwrap();

        assert_eq!(snapshots.len(), 12);
        assert!(snapshots.iter().all(|snapshot| !snapshot.dip));

        let first = snapshots[0];
        assert_eq!(first.date, date!(2015 - 01 - 01));
        assert_eq!(first.total, 12_000.0);
        assert_eq!(first.cash, 2_400.0);
        assert_eq!(first.equity, 9_600.0);

        for snapshot in &snapshots {
            assert!((snapshot.total - 12_000.0).abs() < TOLERANCE);
            assert!((snapshot.equity / snapshot.total - 0.8).abs() < TOLERANCE);
        }
    }

    #[test]
    fn flat_year_fixture_keeps_basis_at_deployed_equity() {
        let prices = monthly_series(&[100.0; 12]);
        let simulator = Simulator::new(fixture_params(), prices.len()).unwrap();
        assert_eq!(simulator.base_allocation(), 1_000.0);

        let mut state = simulator.initial_state();
        let mut previous = None;
        for point in &prices {
            let outcome = simulator.step(state, point, previous);
            state = outcome.state;
            previous = Some(point.close);
        }

        assert!((state.shares - 96.0).abs() < TOLERANCE);
        assert!((state.invested_basis - 9_600.0).abs() < TOLERANCE);
    }

    #[test]
    fn plain_dca_invests_all_capital() {
        let capital = 10_000.0;
        let prices = monthly_series(&[100.0, 120.0, 90.0, 80.0, 110.0, 130.0, 95.0]);

        let snapshots = simulate(&plain_dca(capital), &prices).unwrap();

        let last = snapshots.last().unwrap();
        assert!(last.cash.abs() < TOLERANCE);
        assert!(last.cash >= 0.0);

        let expected_shares: f64 = prices
            .iter()
            .map(|point| capital / prices.len() as f64 / point.close)
            .sum();
        assert!((last.equity - expected_shares * 95.0).abs() < TOLERANCE);
    }

    #[test]
    fn dip_month_buys_multiplied_amount_capped_at_cash() {
        let params = StrategyParams {
            dip_multiplier: 2,
            ..plain_dca(1_200.0)
        };
        let prices = monthly_series(&[100.0, 90.0, 90.0]);

        let snapshots = simulate(&params, &prices).unwrap();

        assert_eq!(
            snapshots.iter().map(|s| s.dip).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert_eq!(snapshots[0].cash, 800.0);
        assert_eq!(snapshots[1].cash, 0.0);
        assert_eq!(snapshots[2].cash, 0.0);
    }

    #[test]
    fn profit_take_sells_surplus_and_keeps_average_cost() {
        let params = StrategyParams {
            profit_take: 0.08,
            ..plain_dca(1_000.0)
        };
        let prices = monthly_series(&[100.0, 200.0]);
        let simulator = Simulator::new(params, prices.len()).unwrap();

        let first = simulator.step(simulator.initial_state(), &prices[0], None);
        let second = simulator.step(first.state, &prices[1], Some(100.0));

        assert!((second.trace.profit_taken - 420.0).abs() < TOLERANCE);
        assert!((second.snapshot.cash - 420.0).abs() < TOLERANCE);
        assert!((second.snapshot.equity - 1_080.0).abs() < TOLERANCE);
        assert!((second.state.invested_basis - 720.0).abs() < TOLERANCE);
        let average_cost = second.state.invested_basis / second.state.shares;
        assert!((average_cost - 1_000.0 / 7.5).abs() < TOLERANCE);
    }

    #[test]
    fn cash_yield_accrues_before_buying() {
        let params = StrategyParams {
            cash_yield_apr: 0.12,
            ..plain_dca(1_200.0)
        };
        let prices = monthly_series(&[100.0]);

        let snapshots = simulate(&params, &prices).unwrap();

        assert!((snapshots[0].cash - 12.0).abs() < TOLERANCE);
        assert!((snapshots[0].equity - 1_200.0).abs() < TOLERANCE);
    }

    #[test]
    fn identical_inputs_produce_identical_snapshots() {
        let prices = monthly_series(&[100.0, 94.0, 99.0, 120.0, 130.0, 101.0, 97.0]);
        let params = StrategyParams::default();

        let first = simulate(&params, &prices).unwrap();
        let second = simulate(&params, &prices).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_series_is_an_input_error() {
        assert_eq!(
            simulate(&StrategyParams::default(), &[]),
            Err(SimulationError::EmptyPriceSeries)
        );
    }

    #[test]
    fn invalid_params_are_an_input_error() {
        let params = StrategyParams {
            capital: -1.0,
            ..StrategyParams::default()
        };
        let prices = monthly_series(&[100.0]);

        assert!(matches!(
            simulate(&params, &prices),
            Err(SimulationError::InvalidParams(_))
        ));
    }

    fn arbitrary_params() -> impl Strategy<Value = StrategyParams> {
        (
            1_000.0..1_000_000.0f64,
            0.0..0.2f64,
            1u32..6,
            prop_oneof![Just(f64::INFINITY), 0.0..0.5f64],
            0.0..0.1f64,
            prop_oneof![Just(None::<f64>), (0.05..=1.0f64).prop_map(Some)],
        )
            .prop_map(
                |(capital, dip_trigger, dip_multiplier, profit_take, cash_yield_apr, equity_target)| {
                    StrategyParams {
                        capital,
                        dip_trigger,
                        dip_multiplier,
                        profit_take,
                        cash_yield_apr,
                        equity_target,
                    }
                },
            )
    }

    fn arbitrary_closes() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(1.0..50_000.0f64, 1..120)
    }

    proptest! {
        #[test]
        fn one_snapshot_per_month_in_order(params in arbitrary_params(), closes in arbitrary_closes()) {
            let prices = monthly_series(&closes);
            let snapshots = simulate(&params, &prices).unwrap();

            prop_assert_eq!(snapshots.len(), prices.len());
            for (snapshot, point) in snapshots.iter().zip(&prices) {
                prop_assert_eq!(snapshot.date, point.date);
                prop_assert_eq!(snapshot.price, point.close);
            }
        }

        #[test]
        fn steps_conserve_value_and_never_borrow(params in arbitrary_params(), closes in arbitrary_closes()) {
            let prices = monthly_series(&closes);
            let simulator = Simulator::new(params, prices.len()).unwrap();
            let mut state = simulator.initial_state();
            let mut previous = None;

            for point in &prices {
                let before = state.cash * params.monthly_yield_factor() + state.equity(point.close);
                let outcome = simulator.step(state, point, previous);
                let after = outcome.snapshot.total;

                prop_assert!((after - before).abs() <= 1e-9 * before.abs().max(1.0));
                prop_assert!(outcome.state.cash >= -1e-9 * before.abs().max(1.0));
                prop_assert!(outcome.state.shares >= -1e-9);

                state = outcome.state;
                previous = Some(point.close);
            }
        }

        #[test]
        fn dip_flag_tracks_monthly_return(params in arbitrary_params(), closes in arbitrary_closes()) {
            let prices = monthly_series(&closes);
            let snapshots = simulate(&params, &prices).unwrap();

            prop_assert!(!snapshots[0].dip);
            for index in 1..closes.len() {
                let monthly_return = (closes[index] - closes[index - 1]) / closes[index - 1];
                prop_assert_eq!(snapshots[index].dip, monthly_return <= -params.dip_trigger);
            }
        }
    }
}
