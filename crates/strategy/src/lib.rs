pub mod basis;
pub mod dip;
pub mod profit;
pub mod rebalance;
pub mod sizing;

pub use basis::reduce_basis_proportional;
pub use dip::{emit_signal, monthly_return, BuySignal};
pub use profit::{take_profit, ProfitTake};
pub use rebalance::{rebalance, Rebalance};
pub use sizing::{capped_buy, size_for_signal, SizingConfig};

#[cfg(test)]
mod tests {
    use crate::{emit_signal, size_for_signal, BuySignal, SizingConfig};

    #[test]
    fn dip_month_buys_multiplied_allocation() {
        let config = SizingConfig::new(50_000.0, 100, 3);
        let signal = emit_signal(Some(100.0), 95.0, 0.03);

        assert_eq!(signal, BuySignal::Dip);
        assert_eq!(size_for_signal(signal, config), 1_500.0);
    }

    #[test]
    fn regular_month_buys_base_allocation() {
        let config = SizingConfig::new(50_000.0, 100, 3);
        let signal = emit_signal(Some(100.0), 99.0, 0.03);

        assert_eq!(size_for_signal(signal, config), 500.0);
    }
}
