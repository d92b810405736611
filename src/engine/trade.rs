use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use chrono::serde::ts_milliseconds;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::Side;

/// Why a position left the open set.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The candle range touched the stop-loss price.
    StopLoss,
    /// The candle range touched the take-profit price.
    TakeProfit,
    /// A SELL intent from the strategy closed the position.
    StrategySignal,
    /// The candle sequence ended with the position still open.
    EndOfBacktest,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::StopLoss => "STOP_LOSS",
            Self::TakeProfit => "TAKE_PROFIT",
            Self::StrategySignal => "STRATEGY_SIGNAL",
            Self::EndOfBacktest => "END_OF_BACKTEST",
        };
        f.write_str(reason)
    }
}

/// A closed trade, appended to the ledger when a position is destroyed.
/// Immutable once recorded.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    /// Time the position was opened.
    #[cfg_attr(feature = "serde", serde(with = "ts_milliseconds"))]
    pub entry_time: DateTime<Utc>,
    /// Time the position was closed.
    #[cfg_attr(feature = "serde", serde(with = "ts_milliseconds"))]
    pub exit_time: DateTime<Utc>,
    /// Direction of the exposure.
    pub side: Side,
    /// Fill price at entry.
    pub entry_price: f64,
    /// Fill price at exit.
    pub exit_price: f64,
    /// Quantity traded.
    pub quantity: f64,
    /// Realized profit and loss.
    pub pnl: f64,
    /// Realized return on the entry notional, in percent.
    pub return_pct: f64,
    /// Why the position was closed.
    pub exit_reason: ExitReason,
    /// Number of candles the position stayed open.
    pub candles_held: u32,
}
