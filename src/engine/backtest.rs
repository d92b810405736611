use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, trace};

use crate::engine::{Action, Candle, ExitReason, OrderIntent, Position, PositionId, Side, Trade};
use crate::errors::{Error, Result};
use crate::metrics::Metrics;

/// Decision source queried once per candle.
///
/// The engine calls [`Strategy::on_candle`] for every candle, in order, and
/// executes at most one resulting [`OrderIntent`] against that same candle.
/// Any state the strategy needs across calls (indicator windows, whether it
/// is currently long) it maintains itself; the engine guarantees only
/// sequencing, not anti-lookahead.
///
/// An error returned here aborts the run immediately: no partial
/// [`Report`] is produced.
pub trait Strategy {
    /// Returns the order intent for the current candle, if any.
    fn on_candle(&mut self, candle: &Candle) -> Result<Option<OrderIntent>>;
}

impl<F> Strategy for F
where
    F: FnMut(&Candle) -> Result<Option<OrderIntent>>,
{
    fn on_candle(&mut self, candle: &Candle) -> Result<Option<OrderIntent>> {
        self(candle)
    }
}

/// Everything a completed run produced: the closed-trade ledger, the equity
/// curve (seeded with the initial capital, one further sample per candle),
/// and the derived performance metrics.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Capital the run started with.
    pub initial_capital: f64,
    /// Cash after the final forced closure of open positions.
    pub final_capital: f64,
    /// Performance metrics derived from the ledger and equity curve.
    pub metrics: Metrics,
    /// Closed trades, in closing order.
    pub trades: Vec<Trade>,
    /// Cash plus unrealized pnl, sampled at each candle's close; index 0 is
    /// the pre-run seed.
    pub equity_curve: Vec<f64>,
    /// Number of closed trades.
    pub total_trades: usize,
    /// Closed trades with `pnl > 0`.
    pub winning_trades: usize,
    /// Closed trades with `pnl <= 0`.
    pub losing_trades: usize,
}

/// Backtesting engine: owns the cash ledger, the open-position arena, the
/// closed-trade ledger and the equity curve, and drives the per-candle loop.
///
/// A run is not resumable: every [`Backtest::run`] resets all of that state
/// before processing the first candle, so the same engine can replay several
/// strategies over the same data.
///
/// ### Example
/// ```rust
/// use candlesim::prelude::*;
/// use chrono::DateTime;
///
/// let ts = DateTime::from_timestamp_secs(1_515_151_515).unwrap();
/// let candle = Candle::from((ts, 100.0, 110.0, 95.0, 105.0, 1.0));
///
/// let mut backtest = Backtest::new(vec![candle], 10_000.0).unwrap();
/// let report = backtest
///     .run(&mut |_candle: &Candle| Ok(Some(OrderIntent::market_buy(1.0))))
///     .unwrap();
///
/// assert_eq!(report.total_trades, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Backtest {
    data: Arc<[Candle]>,
    initial_capital: f64,
    capital: f64,
    next_id: u64,
    positions: BTreeMap<PositionId, Position>,
    trades: Vec<Trade>,
    equity_curve: Vec<f64>,
}

impl Backtest {
    /// Creates a new engine over `data` with `initial_capital` in cash.
    ///
    /// ### Errors
    /// [`Error::NoData`] if `data` is empty, [`Error::NegZeroCapital`] if
    /// `initial_capital` is not a positive finite number. Both fail before
    /// any engine state exists.
    pub fn new(data: impl Into<Arc<[Candle]>>, initial_capital: f64) -> Result<Self> {
        let data = data.into();
        if data.is_empty() {
            return Err(Error::NoData);
        }
        if !(initial_capital.is_finite() && initial_capital > 0.0) {
            return Err(Error::NegZeroCapital(initial_capital));
        }

        Ok(Self {
            data,
            initial_capital,
            capital: initial_capital,
            next_id: 0,
            positions: BTreeMap::new(),
            trades: Vec::new(),
            equity_curve: Vec::new(),
        })
    }

    /// Returns an iterator over the candle data.
    pub fn candles(&self) -> std::slice::Iter<'_, Candle> {
        self.data.iter()
    }

    /// Returns the capital the engine starts each run with.
    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Replays `strategy` over the whole candle sequence and returns the
    /// resulting [`Report`].
    ///
    /// Per candle, in fixed order: open positions are updated (holding
    /// counter, trailing stop, then stop-loss before take-profit — the
    /// stop wins when both fall inside the same candle's range), the
    /// strategy is queried once, its intent (if any) is executed, and the
    /// equity curve is sampled at the close. After the last candle every
    /// remaining position is force-closed at that candle's close.
    ///
    /// Identical inputs produce an identical `Report` on every invocation.
    pub fn run<S: Strategy>(&mut self, strategy: &mut S) -> Result<Report> {
        self.reset();

        let candles = Arc::clone(&self.data);
        for candle in candles.iter() {
            self.manage_positions(candle);

            if let Some(intent) = strategy.on_candle(candle)? {
                self.execute_intent(&intent, candle);
            }

            let unrealized: f64 = self
                .positions
                .values()
                .map(|position| position.unrealized_pnl(candle.close()))
                .sum();
            self.equity_curve.push(self.capital + unrealized);
        }

        // Force-close whatever is still open at the last close.
        if let Some(last) = candles.last() {
            let ids: Vec<PositionId> = self.positions.keys().copied().collect();
            for id in ids {
                self.close_position(id, last.close(), ExitReason::EndOfBacktest, last.timestamp());
            }
        }

        Ok(self.report())
    }

    /// Resets capital, positions, ledger, and equity curve and seeds the
    /// curve with the initial capital.
    fn reset(&mut self) {
        self.capital = self.initial_capital;
        self.next_id = 0;
        self.positions.clear();
        self.trades.clear();
        self.equity_curve.clear();
        self.equity_curve.push(self.initial_capital);
    }

    /// Risk upkeep for every open position, oldest first.
    fn manage_positions(&mut self, candle: &Candle) {
        let ids: Vec<PositionId> = self.positions.keys().copied().collect();
        for id in ids {
            let decision = match self.positions.get_mut(&id) {
                Some(position) => {
                    position.increment_candles_held();
                    position.update_trailing_stop(candle);

                    if position.check_stop_loss(candle) {
                        position.stop_loss().map(|price| (price, ExitReason::StopLoss))
                    } else if position.check_take_profit(candle) {
                        position.take_profit().map(|price| (price, ExitReason::TakeProfit))
                    } else {
                        None
                    }
                }
                None => None,
            };

            if let Some((price, reason)) = decision {
                self.close_position(id, price, reason, candle.timestamp());
            }
        }
    }

    /// Executes one order intent against the current candle. Every rejection
    /// path (malformed intent, unfillable limit, insufficient capital, SELL
    /// with no open LONG) drops the intent silently and leaves state
    /// untouched.
    fn execute_intent(&mut self, intent: &OrderIntent, candle: &Candle) {
        if !intent.is_well_formed() {
            trace!("dropping malformed intent: {intent:?}");
            return;
        }

        match intent.action() {
            Action::Buy => {
                let Some(fill_price) = intent.fill_price(candle) else {
                    trace!("BUY limit not touched, dropping intent");
                    return;
                };

                let cost = fill_price * intent.quantity();
                if cost > self.capital {
                    trace!("BUY dropped: cost {cost:.2} exceeds capital {:.2}", self.capital);
                    return;
                }

                let position = Position::open(
                    Side::Long,
                    fill_price,
                    intent.quantity(),
                    candle.timestamp(),
                    intent.stop_loss_price(),
                    intent.take_profit_price(),
                    intent.trailing_stop_fraction(),
                );
                let id = PositionId(self.next_id);
                self.next_id += 1;
                self.positions.insert(id, position);
                self.capital -= cost;
                debug!("opened LONG {:.6} @ {fill_price:.2}", intent.quantity());
            }
            Action::Sell => {
                // FIFO: the earliest-opened LONG. Ids are monotonic, so the
                // first matching key is the oldest. No shorting via SELL.
                let Some(id) = self
                    .positions
                    .iter()
                    .find(|(_, position)| position.side() == Side::Long)
                    .map(|(id, _)| *id)
                else {
                    trace!("SELL dropped: no open LONG position");
                    return;
                };

                let Some(fill_price) = intent.fill_price(candle) else {
                    trace!("SELL limit not touched, dropping intent");
                    return;
                };

                self.close_position(id, fill_price, intent.exit_reason_or_default(), candle.timestamp());
            }
        }
    }

    /// Removes a position from the open set, credits the exit notional back
    /// to capital, and appends the closed trade to the ledger.
    fn close_position(&mut self, id: PositionId, exit_price: f64, exit_reason: ExitReason, exit_time: DateTime<Utc>) {
        let Some(position) = self.positions.remove(&id) else {
            return;
        };

        let pnl = position.realized_pnl(exit_price);
        self.capital += exit_price * position.quantity();

        let notional = position.entry_price() * position.quantity();
        let return_pct = if notional > 0.0 { pnl / notional * 100.0 } else { 0.0 };

        debug!("closed {:?} @ {exit_price:.2} ({exit_reason}): pnl {pnl:.2}", position.side());

        self.trades.push(Trade {
            entry_time: position.entry_time(),
            exit_time,
            side: position.side(),
            entry_price: position.entry_price(),
            exit_price,
            quantity: position.quantity(),
            pnl,
            return_pct,
            exit_reason,
            candles_held: position.candles_held(),
        });
    }

    fn report(&self) -> Report {
        let winning_trades = self.trades.iter().filter(|t| t.pnl > 0.0).count();
        let metrics = Metrics::compute(self.initial_capital, self.capital, &self.trades, &self.equity_curve);

        Report {
            initial_capital: self.initial_capital,
            final_capital: self.capital,
            metrics,
            trades: self.trades.clone(),
            equity_curve: self.equity_curve.clone(),
            total_trades: self.trades.len(),
            winning_trades,
            losing_trades: self.trades.len() - winning_trades,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn candles(specs: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        let start = DateTime::from_timestamp_secs(1_515_151_515).unwrap();
        specs
            .iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| {
                Candle::from((start + Duration::hours(i as i64), open, high, low, close, 1.0))
            })
            .collect()
    }

    #[test]
    fn empty_data_is_rejected() {
        let result = Backtest::new(Vec::<Candle>::new(), 1_000.0);
        assert!(matches!(result, Err(Error::NoData)));
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        let data = candles(&[(100.0, 100.0, 100.0, 100.0)]);
        assert!(matches!(Backtest::new(data.clone(), 0.0), Err(Error::NegZeroCapital(_))));
        assert!(matches!(Backtest::new(data, -5.0), Err(Error::NegZeroCapital(_))));
    }

    #[test]
    fn single_flat_candle_round_trip() {
        // One candle, open == close == 100. A market BUY fills at 100 and is
        // force-closed at 100 at the end of the run: pnl 0, one trade, all
        // metrics neutral.
        let data = candles(&[(100.0, 100.0, 100.0, 100.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let report = backtest
            .run(&mut |_: &Candle| Ok(Some(OrderIntent::market_buy(1.0))))
            .unwrap();

        assert_eq!(report.total_trades, 1);
        assert_eq!(report.winning_trades, 0);
        assert_eq!(report.losing_trades, 1);
        assert_eq!(report.final_capital, 1_000.0);

        let trade = &report.trades[0];
        assert_eq!(trade.pnl, 0.0);
        assert_eq!(trade.entry_price, 100.0);
        assert_eq!(trade.exit_price, 100.0);
        assert_eq!(trade.exit_reason, ExitReason::EndOfBacktest);
        assert_eq!(trade.candles_held, 0);

        assert_eq!(report.metrics.total_return, 0.0);
        // The equity sample on the entry candle holds only cash plus
        // unrealized pnl, so the buy itself reads as a 10% dip.
        assert_eq!(report.metrics.max_drawdown, -0.1);
        assert_eq!(report.metrics.sharpe_ratio, 0.0);
    }

    #[test]
    fn stop_loss_fills_at_stop_price() {
        // LONG at close=100 of candle 0 with stop 90; candle 1 trades down
        // to 80, so the position exits at the stop price, not the low.
        let data = candles(&[(100.0, 105.0, 95.0, 100.0), (100.0, 100.0, 80.0, 90.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut fired = false;
        let report = backtest
            .run(&mut |_: &Candle| {
                if fired {
                    return Ok(None);
                }
                fired = true;
                Ok(Some(OrderIntent::market_buy(2.0).stop_loss(90.0)))
            })
            .unwrap();

        assert_eq!(report.total_trades, 1);
        let trade = &report.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert_eq!(trade.exit_price, 90.0);
        assert_eq!(trade.pnl, (90.0 - 100.0) * 2.0);
        assert_eq!(trade.candles_held, 1);
        assert_eq!(report.final_capital, 1_000.0 - 20.0);
    }

    #[test]
    fn stop_loss_wins_over_take_profit_in_same_candle() {
        // Candle 1 touches both the target (110) and the stop (90); the
        // stop-loss check runs first by design.
        let data = candles(&[(100.0, 100.0, 100.0, 100.0), (100.0, 115.0, 85.0, 100.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut fired = false;
        let report = backtest
            .run(&mut |_: &Candle| {
                if fired {
                    return Ok(None);
                }
                fired = true;
                Ok(Some(OrderIntent::market_buy(1.0).stop_loss(90.0).take_profit(110.0)))
            })
            .unwrap();

        assert_eq!(report.trades[0].exit_reason, ExitReason::StopLoss);
        assert_eq!(report.trades[0].exit_price, 90.0);
    }

    #[test]
    fn take_profit_fills_at_target() {
        let data = candles(&[(100.0, 100.0, 100.0, 100.0), (100.0, 120.0, 99.0, 115.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut fired = false;
        let report = backtest
            .run(&mut |_: &Candle| {
                if fired {
                    return Ok(None);
                }
                fired = true;
                Ok(Some(OrderIntent::market_buy(1.0).take_profit(110.0)))
            })
            .unwrap();

        assert_eq!(report.trades[0].exit_reason, ExitReason::TakeProfit);
        assert_eq!(report.trades[0].exit_price, 110.0);
        assert_eq!(report.trades[0].pnl, 10.0);
    }

    #[test]
    fn trailing_stop_tightens_then_fires() {
        // Entry at 100 with a 5% trail. Candle 1's high of 110 moves the
        // stop to 104.5; candle 2's low of 104 fires it at 104.5.
        let data = candles(&[
            (100.0, 100.0, 100.0, 100.0),
            (100.0, 110.0, 105.0, 108.0),
            (108.0, 109.0, 104.0, 105.0),
        ]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut fired = false;
        let report = backtest
            .run(&mut |_: &Candle| {
                if fired {
                    return Ok(None);
                }
                fired = true;
                Ok(Some(OrderIntent::market_buy(1.0).trailing_stop(0.05)))
            })
            .unwrap();

        assert_eq!(report.total_trades, 1);
        let trade = &report.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert_eq!(trade.exit_price, 104.5);
        assert_eq!(trade.pnl, 4.5);
    }

    #[test]
    fn no_trades_leaves_everything_neutral() {
        let data = candles(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 110.0, 101.0, 103.0),
        ]);
        let mut backtest = Backtest::new(data, 5_000.0).unwrap();

        let report = backtest.run(&mut |_: &Candle| Ok(None)).unwrap();

        assert_eq!(report.total_trades, 0);
        assert_eq!(report.final_capital, 5_000.0);
        assert_eq!(report.equity_curve, vec![5_000.0; 4]);
        assert_eq!(report.metrics, Metrics::default());
    }

    #[test]
    fn equity_curve_has_one_sample_per_candle_plus_seed() {
        let data = candles(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 110.0, 101.0, 103.0),
            (103.0, 104.0, 99.0, 100.0),
        ]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut bought = false;
        let report = backtest
            .run(&mut |_: &Candle| {
                if bought {
                    return Ok(None);
                }
                bought = true;
                Ok(Some(OrderIntent::market_buy(1.0)))
            })
            .unwrap();

        assert_eq!(report.equity_curve.len(), 1 + 4);
        assert_eq!(report.equity_curve[0], 1_000.0);
        // Entry at close 102 leaves 898 cash; the sample adds only the
        // unrealized pnl, not the position principal.
        assert_eq!(report.equity_curve[1], 898.0);
        // Candle 1 closes at 106: unrealized pnl 4.
        assert_eq!(report.equity_curve[2], 898.0 + 4.0);
    }

    #[test]
    fn buy_exceeding_capital_is_dropped() {
        let data = candles(&[(100.0, 100.0, 100.0, 100.0), (100.0, 100.0, 100.0, 100.0)]);
        let mut backtest = Backtest::new(data, 50.0).unwrap();

        let report = backtest
            .run(&mut |_: &Candle| Ok(Some(OrderIntent::market_buy(1.0))))
            .unwrap();

        assert_eq!(report.total_trades, 0);
        assert_eq!(report.final_capital, 50.0);
    }

    #[test]
    fn unfillable_limit_buy_does_not_carry_over() {
        // The limit at 90 is outside candle 0's range; candle 1 trades down
        // through 90 but the intent was already dropped, and the strategy
        // only fires once.
        let data = candles(&[(100.0, 105.0, 95.0, 100.0), (100.0, 100.0, 85.0, 90.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut fired = false;
        let report = backtest
            .run(&mut |_: &Candle| {
                if fired {
                    return Ok(None);
                }
                fired = true;
                Ok(Some(OrderIntent::limit_buy(90.0, 1.0)))
            })
            .unwrap();

        assert_eq!(report.total_trades, 0);
        assert_eq!(report.final_capital, 1_000.0);
    }

    #[test]
    fn limit_buy_fills_at_limit_price() {
        let data = candles(&[(100.0, 105.0, 95.0, 100.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let report = backtest
            .run(&mut |_: &Candle| Ok(Some(OrderIntent::limit_buy(97.0, 1.0))))
            .unwrap();

        assert_eq!(report.total_trades, 1);
        assert_eq!(report.trades[0].entry_price, 97.0);
    }

    #[test]
    fn sell_without_long_is_ignored() {
        let data = candles(&[(100.0, 105.0, 95.0, 100.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let report = backtest
            .run(&mut |_: &Candle| Ok(Some(OrderIntent::market_sell(1.0))))
            .unwrap();

        assert_eq!(report.total_trades, 0);
        assert_eq!(report.final_capital, 1_000.0);
    }

    #[test]
    fn sell_closes_earliest_long_first() {
        // Two BUYs on candles 0 and 1 at different prices, one SELL on
        // candle 2: the candle-0 position (entry 100) must close first.
        let data = candles(&[
            (100.0, 100.0, 100.0, 100.0),
            (105.0, 105.0, 105.0, 105.0),
            (110.0, 110.0, 110.0, 110.0),
        ]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut step = 0;
        let report = backtest
            .run(&mut |_: &Candle| {
                step += 1;
                Ok(match step {
                    1 | 2 => Some(OrderIntent::market_buy(1.0)),
                    3 => Some(OrderIntent::market_sell(1.0)),
                    _ => None,
                })
            })
            .unwrap();

        assert_eq!(report.total_trades, 2);
        let signal_exit = &report.trades[0];
        assert_eq!(signal_exit.exit_reason, ExitReason::StrategySignal);
        assert_eq!(signal_exit.entry_price, 100.0);
        assert_eq!(signal_exit.pnl, 10.0);

        let forced = &report.trades[1];
        assert_eq!(forced.exit_reason, ExitReason::EndOfBacktest);
        assert_eq!(forced.entry_price, 105.0);
    }

    #[test]
    fn position_opened_on_a_candle_cannot_close_before_the_next() {
        // The stop sits above the entry candle's low, but risk checks run
        // before new entries: the earliest possible exit is candle 1.
        let data = candles(&[(100.0, 105.0, 90.0, 100.0), (100.0, 101.0, 94.0, 95.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut fired = false;
        let report = backtest
            .run(&mut |_: &Candle| {
                if fired {
                    return Ok(None);
                }
                fired = true;
                Ok(Some(OrderIntent::market_buy(1.0).stop_loss(95.0)))
            })
            .unwrap();

        assert_eq!(report.total_trades, 1);
        let trade = &report.trades[0];
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert!(trade.exit_time > trade.entry_time);
        assert_eq!(trade.candles_held, 1);
    }

    #[test]
    fn strategy_error_aborts_the_run() {
        let data = candles(&[(100.0, 100.0, 100.0, 100.0), (100.0, 100.0, 100.0, 100.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut step = 0;
        let result = backtest.run(&mut |_: &Candle| {
            step += 1;
            if step == 2 {
                return Err(Error::strategy("boom"));
            }
            Ok(Some(OrderIntent::market_buy(1.0)))
        });

        assert!(matches!(result, Err(Error::Strategy(_))));
    }

    #[test]
    fn custom_exit_reason_is_recorded() {
        let data = candles(&[(100.0, 100.0, 100.0, 100.0), (100.0, 100.0, 100.0, 100.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut step = 0;
        let report = backtest
            .run(&mut |_: &Candle| {
                step += 1;
                Ok(match step {
                    1 => Some(OrderIntent::market_buy(1.0)),
                    2 => Some(OrderIntent::market_sell(1.0).exit_reason(ExitReason::TakeProfit)),
                    _ => None,
                })
            })
            .unwrap();

        assert_eq!(report.trades[0].exit_reason, ExitReason::TakeProfit);
    }

    #[test]
    fn runs_are_deterministic_and_resettable() {
        let data = candles(&[
            (100.0, 106.0, 98.0, 104.0),
            (104.0, 112.0, 103.0, 110.0),
            (110.0, 111.0, 101.0, 102.0),
            (102.0, 109.0, 100.0, 108.0),
        ]);
        let mut backtest = Backtest::new(data, 2_000.0).unwrap();

        let make_strategy = || {
            let mut long = false;
            move |candle: &Candle| {
                Ok(if !long && candle.close() > candle.open() {
                    long = true;
                    Some(OrderIntent::market_buy(1.0).trailing_stop(0.04))
                } else {
                    None
                })
            }
        };

        let first = backtest.run(&mut make_strategy()).unwrap();
        let second = backtest.run(&mut make_strategy()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn capital_nets_to_realized_pnl() {
        // Buy 2 @ 100 (capital 1000 -> 800), stop out at 90 (credit 180):
        // final capital 980 = initial + pnl.
        let data = candles(&[(100.0, 100.0, 100.0, 100.0), (100.0, 100.0, 85.0, 95.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut fired = false;
        let report = backtest
            .run(&mut |_: &Candle| {
                if fired {
                    return Ok(None);
                }
                fired = true;
                Ok(Some(OrderIntent::market_buy(2.0).stop_loss(90.0)))
            })
            .unwrap();

        let pnl: f64 = report.trades.iter().map(|t| t.pnl).sum();
        assert_eq!(report.final_capital, report.initial_capital + pnl);
        assert_eq!(report.final_capital, 980.0);
        assert_eq!(report.winning_trades + report.losing_trades, report.total_trades);
    }

    #[test]
    fn return_pct_is_relative_to_entry_notional() {
        let data = candles(&[(100.0, 100.0, 100.0, 100.0), (100.0, 120.0, 100.0, 110.0)]);
        let mut backtest = Backtest::new(data, 1_000.0).unwrap();

        let mut fired = false;
        let report = backtest
            .run(&mut |_: &Candle| {
                if fired {
                    return Ok(None);
                }
                fired = true;
                Ok(Some(OrderIntent::market_buy(2.0).take_profit(110.0)))
            })
            .unwrap();

        // pnl 20 on a 200 notional.
        assert_eq!(report.trades[0].return_pct, 10.0);
    }
}
