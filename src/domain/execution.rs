//! Trade simulation.
//!
//! Replays signals over the close series. Every transition converts the
//! whole position at that date's close and debits a proportional fee:
//! a buy pays `fee_rate * cash_before` out of the amount invested, a sell
//! pays `fee_rate * gross_proceeds`. Holding costs nothing.

use chrono::NaiveDate;

use super::portfolio::Portfolio;
use super::position::{PositionState, Trade, TradeDirection};
use super::price::PricePoint;
use super::signal::Signal;

/// Proportional fee on a traded notional.
pub fn calculate_fee(notional: f64, fee_rate: f64) -> f64 {
    notional * fee_rate
}

/// Convert all cash into shares at `price`.
pub fn enter_long(portfolio: &mut Portfolio, date: NaiveDate, price: f64, fee_rate: f64) -> Trade {
    let cash_before = portfolio.position.cash;
    let fee = calculate_fee(cash_before, fee_rate);
    let shares = (cash_before - fee) / price;

    let position = &mut portfolio.position;
    position.cash = 0.0;
    position.shares += shares;
    position.state = PositionState::Long;

    Trade {
        date,
        direction: TradeDirection::Buy,
        price,
        shares,
        fee_paid: fee,
    }
}

/// Convert all shares into cash at `price`.
pub fn exit_long(portfolio: &mut Portfolio, date: NaiveDate, price: f64, fee_rate: f64) -> Trade {
    let shares = portfolio.position.shares;
    let gross = shares * price;
    let fee = calculate_fee(gross, fee_rate);

    let position = &mut portfolio.position;
    position.cash += gross - fee;
    position.shares = 0.0;
    position.state = PositionState::Flat;

    Trade {
        date,
        direction: TradeDirection::Sell,
        price,
        shares,
        fee_paid: fee,
    }
}

/// Run one simulation. `signals` must be aligned with `prices`; the
/// returned portfolio has one equity point per price.
pub fn simulate(
    prices: &[PricePoint],
    signals: &[Signal],
    initial_capital: f64,
    fee_rate: f64,
) -> Portfolio {
    debug_assert_eq!(prices.len(), signals.len());

    let mut portfolio = Portfolio::new(initial_capital);

    for (point, &desired) in prices.iter().zip(signals) {
        if let Some(direction) = portfolio.position.state.transition(desired) {
            let trade = match direction {
                TradeDirection::Buy => enter_long(&mut portfolio, point.date, point.close, fee_rate),
                TradeDirection::Sell => exit_long(&mut portfolio, point.date, point.close, fee_rate),
            };
            portfolio.record_trade(trade);
        }
        portfolio.record_equity(point.date, point.close);
    }

    portfolio
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Signal::{HoldCash as C, HoldLong as L};
    use approx::assert_relative_eq;

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
    fn fee_is_proportional() {
        assert_relative_eq!(calculate_fee(10_000.0, 0.001), 10.0);
        assert_relative_eq!(calculate_fee(10_000.0, 0.0), 0.0);
    }

    #[test]
    fn enter_long_deducts_fee_from_investment() {
        let mut portfolio = Portfolio::new(1_000.0);
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let trade = enter_long(&mut portfolio, date, 10.0, 0.01);

        assert_eq!(trade.direction, TradeDirection::Buy);
        assert_relative_eq!(trade.fee_paid, 10.0);
        assert_relative_eq!(trade.shares, 99.0);
        assert_relative_eq!(portfolio.position.cash, 0.0);
        assert!(portfolio.position.is_long());
    }

    #[test]
    fn exit_long_deducts_fee_from_proceeds() {
        let mut portfolio = Portfolio::new(1_000.0);
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        enter_long(&mut portfolio, date, 10.0, 0.0);
        let trade = exit_long(&mut portfolio, date.succ_opt().unwrap(), 20.0, 0.01);

        assert_eq!(trade.direction, TradeDirection::Sell);
        assert_relative_eq!(trade.shares, 100.0);
        assert_relative_eq!(trade.fee_paid, 20.0);
        assert_relative_eq!(portfolio.position.cash, 1_980.0);
        assert_relative_eq!(portfolio.position.shares, 0.0);
        assert!(!portfolio.position.is_long());
    }

    #[test]
    fn no_signals_keeps_initial_capital() {
        let prices = make_prices(&[10.0, 12.0, 8.0]);
        let portfolio = simulate(&prices, &[C, C, C], 1_000.0, 0.001);

        assert!(portfolio.trades.is_empty());
        assert_eq!(portfolio.equity_curve.len(), 3);
        for p in &portfolio.equity_curve {
            assert_relative_eq!(p.equity, 1_000.0);
        }
    }

    #[test]
    fn round_trip_at_unchanged_price_without_fee() {
        let prices = make_prices(&[10.0, 10.0, 10.0, 10.0]);
        let portfolio = simulate(&prices, &[C, L, L, C], 1_000.0, 0.0);

        assert_eq!(portfolio.trades.len(), 2);
        assert_relative_eq!(portfolio.final_equity(), 1_000.0);
    }

    #[test]
    fn equity_tracks_price_while_long() {
        let prices = make_prices(&[10.0, 10.0, 12.0, 9.0]);
        let portfolio = simulate(&prices, &[C, L, L, L], 1_000.0, 0.0);

        let equity: Vec<f64> = portfolio.equity_curve.iter().map(|p| p.equity).collect();
        assert_relative_eq!(equity[0], 1_000.0);
        assert_relative_eq!(equity[1], 1_000.0);
        assert_relative_eq!(equity[2], 1_200.0);
        assert_relative_eq!(equity[3], 900.0);
    }

    #[test]
    fn fees_reduce_equity_at_each_transition() {
        let prices = make_prices(&[10.0, 10.0, 10.0]);
        let portfolio = simulate(&prices, &[L, L, C], 1_000.0, 0.01);

        // buy: fee 10 -> 99 shares; sell: gross 990, fee 9.9
        assert_relative_eq!(portfolio.equity_curve[0].equity, 990.0);
        assert_relative_eq!(portfolio.equity_curve[1].equity, 990.0);
        assert_relative_eq!(portfolio.equity_curve[2].equity, 980.1);
        assert_relative_eq!(portfolio.fees_paid(), 19.9);
    }

    #[test]
    fn trades_alternate_direction() {
        let prices = make_prices(&[10.0, 11.0, 12.0, 11.0, 10.0, 9.0]);
        let portfolio = simulate(&prices, &[L, C, L, L, C, L], 1_000.0, 0.001);

        let directions: Vec<_> = portfolio.trades.iter().map(|t| t.direction).collect();
        assert_eq!(
            directions,
            vec![
                TradeDirection::Buy,
                TradeDirection::Sell,
                TradeDirection::Buy,
                TradeDirection::Sell,
                TradeDirection::Buy,
            ]
        );
    }

    #[test]
    fn equity_identity_holds_every_date() {
        let prices = make_prices(&[10.0, 11.5, 9.25, 13.0, 12.0, 8.5, 10.0]);
        let signals = [C, L, L, C, L, C, C];
        let portfolio = simulate(&prices, &signals, 5_000.0, 0.0025);

        for ((point, pos), price) in portfolio
            .equity_curve
            .iter()
            .zip(&portfolio.history)
            .zip(&prices)
        {
            assert_eq!(point.equity, pos.cash + pos.shares * price.close);
        }
    }

    #[test]
    fn identical_inputs_are_reproducible() {
        let prices = make_prices(&[10.0, 11.5, 9.25, 13.0, 12.0]);
        let signals = [C, L, L, C, L];
        let a = simulate(&prices, &signals, 5_000.0, 0.0025);
        let b = simulate(&prices, &signals, 5_000.0, 0.0025);
        assert_eq!(a, b);
    }
}
