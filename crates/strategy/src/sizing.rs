use crate::dip::BuySignal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingConfig {
    base_allocation: f64,
    dip_multiplier: u32,
}

impl SizingConfig {
    /// Spreads `capital` evenly over `months` purchases.
    ///
    /// `months == 0` yields a zero allocation; callers reject empty series
    /// before sizing anything.
    pub fn new(capital: f64, months: usize, dip_multiplier: u32) -> Self {
        let base_allocation = if months == 0 {
            0.0
        } else {
            capital / months as f64
        };

        Self {
            base_allocation,
            dip_multiplier: dip_multiplier.max(1),
        }
    }

    pub fn base_allocation(&self) -> f64 {
        self.base_allocation
    }
}

pub fn size_for_signal(signal: BuySignal, config: SizingConfig) -> f64 {
    match signal {
        BuySignal::Regular => config.base_allocation,
        BuySignal::Dip => config.base_allocation * f64::from(config.dip_multiplier),
    }
}

/// Caps a purchase at the cash on hand. Never returns a negative amount.
pub fn capped_buy(amount: f64, cash: f64) -> f64 {
    amount.min(cash).max(0.0)
}
