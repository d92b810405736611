use std::fmt;

use crate::engine::Trade;

/// Performance summary derived from a closed-trade ledger and an equity
/// curve.
///
/// Returns and drawdown are fractions (0.05 is +5%), `win_rate` is a
/// fraction of closed trades, `avg_loss` is reported as a magnitude. With
/// an empty ledger everything is 0.0, including the Sharpe ratio and the
/// drawdown, so a strategy that never traded reads as neutral rather than
/// undefined.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    /// `(final_capital - initial_capital) / initial_capital`.
    pub total_return: f64,
    /// Annualized mean-over-deviation of per-candle equity returns
    /// (√252 factor). 0.0 when there are no usable returns or the
    /// deviation is zero.
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough equity decline, 0.0 or negative.
    pub max_drawdown: f64,
    /// Share of closed trades with `pnl > 0`.
    pub win_rate: f64,
    /// Mean pnl of winning trades.
    pub avg_win: f64,
    /// Mean magnitude of losing trades' pnl.
    pub avg_loss: f64,
    /// Gross profit over gross loss. 0.0 when there are no losing trades.
    pub profit_factor: f64,
}

impl Metrics {
    /// Computes the full metric set for one finished run.
    ///
    /// Pure: reads only its arguments. An empty `trades` ledger
    /// short-circuits to [`Metrics::default`].
    pub fn compute(initial_capital: f64, final_capital: f64, trades: &[Trade], equity_curve: &[f64]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }

        let total_return = (final_capital - initial_capital) / initial_capital;

        let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
        let gross_loss: f64 = trades.iter().filter(|t| t.pnl <= 0.0).map(|t| t.pnl.abs()).sum();
        let winners = trades.iter().filter(|t| t.pnl > 0.0).count();
        let losers = trades.len() - winners;

        let win_rate = winners as f64 / trades.len() as f64;
        let avg_win = if winners > 0 { gross_profit / winners as f64 } else { 0.0 };
        let avg_loss = if losers > 0 { gross_loss / losers as f64 } else { 0.0 };
        let profit_factor = if gross_loss > 0.0 { gross_profit / gross_loss } else { 0.0 };

        Self {
            total_return,
            sharpe_ratio: sharpe_ratio(equity_curve),
            max_drawdown: max_drawdown(equity_curve),
            win_rate,
            avg_win,
            avg_loss,
            profit_factor,
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total return:  {:>8.2}%", self.total_return * 100.0)?;
        writeln!(f, "sharpe ratio:  {:>8.2}", self.sharpe_ratio)?;
        writeln!(f, "max drawdown:  {:>8.2}%", self.max_drawdown * 100.0)?;
        writeln!(f, "win rate:      {:>8.2}%", self.win_rate * 100.0)?;
        writeln!(f, "avg win:       {:>8.2}", self.avg_win)?;
        writeln!(f, "avg loss:      {:>8.2}", self.avg_loss)?;
        write!(f, "profit factor: {:>8.2}", self.profit_factor)
    }
}

/// Annualized Sharpe ratio over simple per-sample equity returns.
/// Samples following a non-positive equity value are skipped; population
/// standard deviation, no risk-free leg.
fn sharpe_ratio(equity_curve: &[f64]) -> f64 {
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();

    if returns.is_empty() {
        return 0.0;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
    let std_dev = variance.sqrt();

    if std_dev > 0.0 {
        mean / std_dev * 252f64.sqrt()
    } else {
        0.0
    }
}

/// Most negative peak-relative decline in the equity curve, 0.0 with fewer
/// than two samples.
fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let mut peak = equity_curve[0];
    let mut max_dd = 0.0f64;
    for &equity in &equity_curve[1..] {
        if equity > peak {
            peak = equity;
        } else {
            let dd = (equity - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ExitReason, Side};
    use chrono::DateTime;

    fn trade(pnl: f64) -> Trade {
        let ts = DateTime::from_timestamp_secs(1_515_151_515).unwrap();
        Trade {
            entry_time: ts,
            exit_time: ts,
            side: Side::Long,
            entry_price: 100.0,
            exit_price: 100.0 + pnl,
            quantity: 1.0,
            pnl,
            return_pct: pnl,
            exit_reason: ExitReason::StrategySignal,
            candles_held: 1,
        }
    }

    #[test]
    fn empty_ledger_is_all_zeros() {
        let metrics = Metrics::compute(1_000.0, 1_200.0, &[], &[1_000.0, 1_200.0]);
        assert_eq!(metrics, Metrics::default());
    }

    #[test]
    fn win_and_loss_aggregates() {
        let trades = [trade(30.0), trade(10.0), trade(-20.0), trade(0.0)];
        let metrics = Metrics::compute(1_000.0, 1_020.0, &trades, &[1_000.0, 1_020.0]);

        assert_eq!(metrics.total_return, 0.02);
        assert_eq!(metrics.win_rate, 0.5);
        assert_eq!(metrics.avg_win, 20.0);
        // Breakeven trades count as losers but only the -20 contributes.
        assert_eq!(metrics.avg_loss, 10.0);
        assert_eq!(metrics.profit_factor, 2.0);
    }

    #[test]
    fn profit_factor_is_zero_without_losses() {
        let trades = [trade(10.0), trade(5.0)];
        let metrics = Metrics::compute(1_000.0, 1_015.0, &trades, &[1_000.0, 1_015.0]);
        assert_eq!(metrics.profit_factor, 0.0);
        assert_eq!(metrics.avg_loss, 0.0);
        assert_eq!(metrics.win_rate, 1.0);
    }

    #[test]
    fn drawdown_tracks_the_running_peak() {
        // Peak 120, trough 90: dd = -0.25. The later recovery to 110 does
        // not shrink it.
        let curve = [100.0, 120.0, 90.0, 110.0];
        assert_eq!(max_drawdown(&curve), (90.0 - 120.0) / 120.0);
    }

    #[test]
    fn drawdown_needs_two_samples() {
        assert_eq!(max_drawdown(&[100.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn monotonic_curve_has_zero_drawdown() {
        assert_eq!(max_drawdown(&[100.0, 105.0, 110.0]), 0.0);
    }

    #[test]
    fn sharpe_is_zero_for_constant_equity() {
        assert_eq!(sharpe_ratio(&[1_000.0, 1_000.0, 1_000.0]), 0.0);
    }

    #[test]
    fn sharpe_skips_returns_after_non_positive_equity() {
        // The sample following the 0.0 would divide by zero and is dropped.
        assert_eq!(sharpe_ratio(&[0.0, 100.0]), 0.0);
        assert!(sharpe_ratio(&[100.0, 0.0, 100.0, 110.0]).is_finite());
    }

    #[test]
    fn sharpe_matches_hand_computation() {
        // Returns: 0.10, -0.05. mean = 0.025, population std = 0.075.
        let curve = [100.0, 110.0, 104.5];
        let returns: [f64; 2] = [0.10, 104.5 / 110.0 - 1.0];
        let mean = (returns[0] + returns[1]) / 2.0;
        let variance = ((returns[0] - mean).powi(2) + (returns[1] - mean).powi(2)) / 2.0;
        let expected = mean / variance.sqrt() * 252f64.sqrt();
        assert!((sharpe_ratio(&curve) - expected).abs() < 1e-12);
    }
}
