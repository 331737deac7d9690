use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Daily simple returns for one symbol, ordered by date. Empty means the
/// provider knew nothing about the symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub symbol: String,
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn new(symbol: impl Into<String>, mut points: Vec<ReturnPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    /// Builds close-to-close returns. The first close only seeds the
    /// calculation; non-positive or non-finite closes are skipped.
    pub fn from_closes(symbol: impl Into<String>, closes: &[(NaiveDate, f64)]) -> Self {
        let mut points = Vec::with_capacity(closes.len().saturating_sub(1));
        let mut prev: Option<f64> = None;
        for &(date, close) in closes {
            if !close.is_finite() || close <= 0.0 {
                continue;
            }
            if let Some(p) = prev {
                points.push(ReturnPoint {
                    date,
                    value: close / p - 1.0,
                });
            }
            prev = Some(close);
        }
        Self::new(symbol, points)
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::d;
    use super::*;

    #[test]
    fn from_closes_drops_seed_bar_and_bad_prices() {
        let closes = [
            (d(2025, 1, 2), 100.0),
            (d(2025, 1, 3), 110.0),
            (d(2025, 1, 6), f64::NAN),
            (d(2025, 1, 7), 99.0),
        ];
        let s = ReturnSeries::from_closes("AAPL", &closes);
        assert_eq!(s.len(), 2);
        assert!((s.points[0].value - 0.10).abs() < 1e-12);
        assert!((s.points[1].value - (-0.10)).abs() < 1e-12);
        assert_eq!(s.first_date(), Some(d(2025, 1, 3)));
    }

    #[test]
    fn new_orders_points_by_date() {
        let s = ReturnSeries::new(
            "X",
            vec![
                ReturnPoint { date: d(2025, 3, 2), value: 0.2 },
                ReturnPoint { date: d(2025, 3, 1), value: 0.1 },
            ],
        );
        assert_eq!(s.values(), vec![0.1, 0.2]);
    }
}
