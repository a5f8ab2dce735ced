use time::Date;

/// Portfolio as of the close of one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub date: Date,
    pub price: f64,
    pub total: f64,
    pub cash: f64,
    pub equity: f64,
    pub dip: bool,
}
