use crate::basis::reduce_basis_proportional;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitTake {
    pub shares_sold: f64,
    pub proceeds: f64,
    pub remaining_basis: f64,
}

/// Sells the equity held above `basis * (1 + threshold)` once the
/// unrealized gain exceeds `threshold`.
///
/// Returns `None` when nothing is invested or the gain is at or below the
/// threshold. An infinite threshold never triggers.
pub fn take_profit(shares: f64, price: f64, basis: f64, threshold: f64) -> Option<ProfitTake> {
    if basis <= 0.0 || shares <= 0.0 || price <= 0.0 {
        return None;
    }

    let equity = shares * price;
    if equity / basis - 1.0 <= threshold {
        return None;
    }

    let proceeds = equity - basis * (1.0 + threshold);
    let shares_sold = proceeds / price;

    Some(ProfitTake {
        shares_sold,
        proceeds,
        remaining_basis: reduce_basis_proportional(basis, shares, shares_sold),
    })
}
