//! Buy-and-hold benchmark.
//!
//! Invests the full capital at the first close and holds to the last date.
//! The entry is fee-exempt.

use super::portfolio::EquityPoint;
use super::price::PricePoint;

pub fn buy_and_hold(prices: &[PricePoint], initial_capital: f64) -> Vec<EquityPoint> {
    let Some(first) = prices.first() else {
        return Vec::new();
    };
    let shares = initial_capital / first.close;

    prices
        .iter()
        .map(|p| EquityPoint {
            date: p.date,
            equity: shares * p.close,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_prices(closes: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
            })
            .collect()
    }

    #[test]
    fn empty_prices_give_empty_curve() {
        assert!(buy_and_hold(&[], 1_000.0).is_empty());
    }

    #[test]
    fn starts_at_initial_capital() {
        let curve = buy_and_hold(&make_prices(&[37.0, 40.0]), 1_000.0);
        assert_relative_eq!(curve[0].equity, 1_000.0);
    }

    #[test]
    fn scales_with_price() {
        let prices = make_prices(&[10.0, 12.0, 9.0, 15.0]);
        let curve = buy_and_hold(&prices, 1_000.0);

        assert_eq!(curve.len(), 4);
        let equity: Vec<f64> = curve.iter().map(|p| p.equity).collect();
        assert_relative_eq!(equity[1], 1_200.0);
        assert_relative_eq!(equity[2], 900.0);
        assert_relative_eq!(equity[3], 1_500.0);
        for (p, e) in prices.iter().zip(&curve) {
            assert_eq!(p.date, e.date);
        }
    }
}
