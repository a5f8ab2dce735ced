/// Running portfolio between months. Threaded by value through
/// [`crate::Simulator::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub shares: f64,
    /// Principal attributed to the shares currently held.
    pub invested_basis: f64,
}

impl PortfolioState {
    pub fn new(capital: f64) -> Self {
        Self {
            cash: capital,
            shares: 0.0,
            invested_basis: 0.0,
        }
    }

    pub fn equity(&self, price: f64) -> f64 {
        self.shares * price
    }

    pub fn total(&self, price: f64) -> f64 {
        self.cash + self.equity(price)
    }
}
