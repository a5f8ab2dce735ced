use time::Date;

use crate::series::PricePoint;

/// Seeded random walk of monthly closes, dated on the first of each month.
#[derive(Debug, Clone)]
pub struct MonthlySeriesGenerator {
    state: u64,
    date: Date,
    price: f64,
    max_step_pct: f64,
}

impl MonthlySeriesGenerator {
    pub fn new(seed: u64, start: Date, start_price: f64, max_step_pct: f64) -> Self {
        assert!(
            start_price.is_finite() && start_price > 0.0,
            "start_price must be finite and positive"
        );
        assert!(
            max_step_pct.is_finite() && (0.0..1.0).contains(&max_step_pct),
            "max_step_pct must be finite and within [0, 1)"
        );

        Self {
            state: seed,
            date: start.replace_day(1).unwrap_or(start),
            price: start_price,
            max_step_pct,
        }
    }

    pub fn next_point(&mut self) -> PricePoint {
        let point = PricePoint::new(self.date, self.price);

        let unit = next_unit(&mut self.state);
        let step = (unit * 2.0 - 1.0) * self.max_step_pct;
        self.price *= 1.0 + step;
        self.date = next_month(self.date);

        point
    }

    pub fn take_months(&mut self, months: usize) -> Vec<PricePoint> {
        (0..months).map(|_| self.next_point()).collect()
    }
}

fn next_month(date: Date) -> Date {
    let (year, month) = if date.month() == time::Month::December {
        (date.year() + 1, time::Month::January)
    } else {
        (date.year(), date.month().next())
    };

    Date::from_calendar_date(year, month, 1).unwrap_or(date)
}

fn next_u64(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

fn next_unit(state: &mut u64) -> f64 {
    let value = next_u64(state);
    (value as f64) / (u64::MAX as f64)
}
