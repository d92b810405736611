use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::Candle;

/// Direction of an open exposure.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Profits when the price rises.
    Long,
    /// Profits when the price falls.
    Short,
}

/// Opaque key addressing a position in the engine's open set.
///
/// Ids are handed out in strictly increasing order, so iterating an ordered
/// map keyed by `PositionId` visits positions oldest-first even when two
/// positions carry identical field values.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionId(pub(crate) u64);

/// A single open exposure with risk-exit evaluation and mutable
/// trailing-stop state.
///
/// Created when a BUY fills; mutated once per candle while open; destroyed
/// on a stop/target hit, an opposing SELL, or forced end-of-run closure.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    side: Side,
    entry_price: f64,
    quantity: f64,
    entry_time: DateTime<Utc>,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
    trailing_stop: Option<f64>,
    candles_held: u32,
    // High/low-water marks for the trailing stop, seeded at the entry price.
    highest_price: f64,
    lowest_price: f64,
}

impl Position {
    /// Opens a position at `entry_price` with optional risk parameters.
    /// `trailing_stop` is a fraction of the water mark, e.g. 0.05 for 5%.
    pub fn open(
        side: Side,
        entry_price: f64,
        quantity: f64,
        entry_time: DateTime<Utc>,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
        trailing_stop: Option<f64>,
    ) -> Self {
        Self {
            side,
            entry_price,
            quantity,
            entry_time,
            stop_loss,
            take_profit,
            trailing_stop,
            candles_held: 0,
            highest_price: entry_price,
            lowest_price: entry_price,
        }
    }

    /// Returns the direction of the exposure.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns the fill price at entry.
    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    /// Returns the quantity held.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Returns the time the position was opened.
    pub fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }

    /// Returns the current stop-loss price, if set. Trailing updates only
    /// ever tighten this value.
    pub fn stop_loss(&self) -> Option<f64> {
        self.stop_loss
    }

    /// Returns the take-profit price, if set.
    pub fn take_profit(&self) -> Option<f64> {
        self.take_profit
    }

    /// Returns the trailing-stop fraction, if set.
    pub fn trailing_stop(&self) -> Option<f64> {
        self.trailing_stop
    }

    /// Returns how many candles the position has been open.
    pub fn candles_held(&self) -> u32 {
        self.candles_held
    }

    /// Counts one more candle of holding time.
    pub(crate) fn increment_candles_held(&mut self) {
        self.candles_held += 1;
    }

    /// Returns true iff the candle's range touched the stop-loss:
    /// for LONG the low at or below the stop, for SHORT the high at or above.
    pub fn check_stop_loss(&self, candle: &Candle) -> bool {
        let Some(stop_loss) = self.stop_loss else {
            return false;
        };
        match self.side {
            Side::Long => candle.low() <= stop_loss,
            Side::Short => candle.high() >= stop_loss,
        }
    }

    /// Returns true iff the candle's range touched the take-profit:
    /// for LONG the high at or above the target, for SHORT the low at or below.
    pub fn check_take_profit(&self, candle: &Candle) -> bool {
        let Some(take_profit) = self.take_profit else {
            return false;
        };
        match self.side {
            Side::Long => candle.high() >= take_profit,
            Side::Short => candle.low() <= take_profit,
        }
    }

    /// Advances the trailing stop when the candle sets a new water mark.
    ///
    /// For LONG a new high moves the mark and proposes
    /// `mark × (1 − fraction)` as the stop; it is adopted only if strictly
    /// tighter (higher) than the current one. SHORT mirrors this downward
    /// with `mark × (1 + fraction)`. The stop never loosens.
    ///
    /// Returns the new stop price if it was adopted.
    pub fn update_trailing_stop(&mut self, candle: &Candle) -> Option<f64> {
        let fraction = self.trailing_stop?;
        match self.side {
            Side::Long => {
                if candle.high() > self.highest_price {
                    self.highest_price = candle.high();
                    let candidate = self.highest_price * (1.0 - fraction);
                    if candidate > self.stop_loss.unwrap_or(0.0) {
                        self.stop_loss = Some(candidate);
                        return Some(candidate);
                    }
                }
            }
            Side::Short => {
                if candle.low() < self.lowest_price {
                    self.lowest_price = candle.low();
                    let candidate = self.lowest_price * (1.0 + fraction);
                    if candidate < self.stop_loss.unwrap_or(f64::INFINITY) {
                        self.stop_loss = Some(candidate);
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }

    /// Profit and loss if the position were closed at `price`.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self.side {
            Side::Long => (price - self.entry_price) * self.quantity,
            Side::Short => (self.entry_price - price) * self.quantity,
        }
    }

    /// Profit and loss realized by closing at `exit_price`. Same formula as
    /// [`Self::unrealized_pnl`], evaluated once against the actual fill.
    pub fn realized_pnl(&self, exit_price: f64) -> f64 {
        self.unrealized_pnl(exit_price)
    }
}
