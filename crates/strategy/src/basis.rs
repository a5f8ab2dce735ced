/// Removes the slice of `basis` attributable to `shares_sold` out of
/// `shares_before`, keeping the average cost per remaining share unchanged.
///
/// With no shares held there is nothing to attribute, and the basis is
/// returned as is.
pub fn reduce_basis_proportional(basis: f64, shares_before: f64, shares_sold: f64) -> f64 {
    if shares_before <= 0.0 {
        return basis;
    }

    basis * (1.0 - shares_sold / shares_before)
}
