#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuySignal {
    Dip,
    Regular,
}

/// Month-over-month return of `price` against `previous_close`.
///
/// The first month of a series has no predecessor and reports `0.0`.
pub fn monthly_return(previous_close: Option<f64>, price: f64) -> f64 {
    match previous_close {
        Some(previous) if previous > 0.0 => (price - previous) / previous,
        _ => 0.0,
    }
}

pub fn emit_signal(previous_close: Option<f64>, price: f64, trigger: f64) -> BuySignal {
    let monthly_return = monthly_return(previous_close, price);

    if previous_close.is_some() && monthly_return <= -trigger {
        BuySignal::Dip
    } else {
        BuySignal::Regular
    }
}
