use crate::basis::reduce_basis_proportional;
use crate::sizing::capped_buy;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rebalance {
    Buy {
        amount: f64,
        shares: f64,
    },
    Sell {
        amount: f64,
        shares: f64,
        remaining_basis: f64,
    },
    Hold,
}

/// Moves the portfolio toward `equity_target` of its total value.
///
/// Buys are capped at `cash`. Sells reduce `basis` in proportion to the
/// shares removed.
pub fn rebalance(cash: f64, shares: f64, basis: f64, price: f64, equity_target: f64) -> Rebalance {
    if price <= 0.0 {
        return Rebalance::Hold;
    }

    let equity = shares * price;
    let target_equity = (cash + equity) * equity_target;
    let adjustment = target_equity - equity;

    if adjustment > 0.0 {
        let amount = capped_buy(adjustment, cash);
        if amount <= 0.0 {
            return Rebalance::Hold;
        }
        Rebalance::Buy {
            amount,
            shares: amount / price,
        }
    } else if adjustment < 0.0 {
        let amount = -adjustment;
        let shares_sold = amount / price;
        Rebalance::Sell {
            amount,
            shares: shares_sold,
            remaining_basis: reduce_basis_proportional(basis, shares, shares_sold),
        }
    } else {
        Rebalance::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::{rebalance, Rebalance};

    #[test]
    fn buys_shortfall_toward_target() {
        let action = rebalance(11_000.0, 10.0, 1_000.0, 100.0, 0.8);

        assert_eq!(
            action,
            Rebalance::Buy {
                amount: 8_600.0,
                shares: 86.0,
            }
        );
    }

    #[test]
    fn sells_excess_and_reduces_basis_proportionally() {
        let action = rebalance(1_400.0, 106.0, 10_600.0, 100.0, 0.8);

        match action {
            Rebalance::Sell {
                amount,
                shares,
                remaining_basis,
            } => {
                assert_eq!(amount, 1_000.0);
                assert_eq!(shares, 10.0);
                assert!((remaining_basis - 9_600.0).abs() < 1e-9);
            }
            other => panic!("expected sell, got {other:?}"),
        }
    }

    #[test]
    fn shortfall_without_cash_holds() {
        assert_eq!(rebalance(0.0, 1.0, 100.0, 100.0, 0.8), Rebalance::Hold);
    }

    #[test]
    fn balanced_portfolio_holds() {
        assert_eq!(rebalance(200.0, 8.0, 800.0, 100.0, 0.8), Rebalance::Hold);
    }

    #[test]
    fn full_equity_target_deploys_all_cash() {
        let action = rebalance(500.0, 5.0, 500.0, 100.0, 1.0);

        assert_eq!(
            action,
            Rebalance::Buy {
                amount: 500.0,
                shares: 5.0,
            }
        );
    }
}
