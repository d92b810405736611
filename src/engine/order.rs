#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::{Candle, ExitReason};

/// What the strategy wants the engine to do with the current candle.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open a new LONG position.
    Buy,
    /// Close the earliest open LONG position.
    Sell,
}

/// How the fill price is determined.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderKind {
    /// Fill at the candle's close.
    Market,
    /// Fill at the given price, but only if the candle's range touches it.
    /// An unfillable limit intent is dropped; it never rests across candles.
    Limit(f64),
}

/// The decision a strategy emits for a candle: at most one per candle,
/// executed immediately against that candle or dropped.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderIntent {
    action: Action,
    kind: OrderKind,
    quantity: f64,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
    trailing_stop: Option<f64>,
    exit_reason: Option<ExitReason>,
}

impl From<(Action, OrderKind, f64)> for OrderIntent {
    fn from((action, kind, quantity): (Action, OrderKind, f64)) -> Self {
        Self {
            action,
            kind,
            quantity,
            stop_loss: None,
            take_profit: None,
            trailing_stop: None,
            exit_reason: None,
        }
    }
}

impl OrderIntent {
    /// Creates a market BUY for the given quantity.
    pub fn market_buy(quantity: f64) -> Self {
        (Action::Buy, OrderKind::Market, quantity).into()
    }

    /// Creates a market SELL for the given quantity.
    pub fn market_sell(quantity: f64) -> Self {
        (Action::Sell, OrderKind::Market, quantity).into()
    }

    /// Creates a limit BUY at `price` for the given quantity.
    pub fn limit_buy(price: f64, quantity: f64) -> Self {
        (Action::Buy, OrderKind::Limit(price), quantity).into()
    }

    /// Creates a limit SELL at `price` for the given quantity.
    pub fn limit_sell(price: f64, quantity: f64) -> Self {
        (Action::Sell, OrderKind::Limit(price), quantity).into()
    }

    /// Attaches a fixed stop-loss price (BUY only).
    pub fn stop_loss(mut self, price: f64) -> Self {
        self.stop_loss = Some(price);
        self
    }

    /// Attaches a take-profit price (BUY only).
    pub fn take_profit(mut self, price: f64) -> Self {
        self.take_profit = Some(price);
        self
    }

    /// Attaches a trailing-stop fraction, e.g. 0.05 for 5% (BUY only).
    pub fn trailing_stop(mut self, fraction: f64) -> Self {
        self.trailing_stop = Some(fraction);
        self
    }

    /// Overrides the recorded exit reason (SELL only, defaults to
    /// [`ExitReason::StrategySignal`]).
    pub fn exit_reason(mut self, reason: ExitReason) -> Self {
        self.exit_reason = Some(reason);
        self
    }

    /// Returns the requested action.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns how the fill price is determined.
    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    /// Returns the requested quantity.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Returns the attached stop-loss price, if any.
    pub fn stop_loss_price(&self) -> Option<f64> {
        self.stop_loss
    }

    /// Returns the attached take-profit price, if any.
    pub fn take_profit_price(&self) -> Option<f64> {
        self.take_profit
    }

    /// Returns the attached trailing-stop fraction, if any.
    pub fn trailing_stop_fraction(&self) -> Option<f64> {
        self.trailing_stop
    }

    /// Returns the exit reason a SELL should record.
    pub fn exit_reason_or_default(&self) -> ExitReason {
        self.exit_reason.unwrap_or(ExitReason::StrategySignal)
    }

    /// Determines the fill price against `candle`: the close for a market
    /// intent, the limit price if it lies within `[low, high]`, `None`
    /// otherwise (the intent is dropped, unfilled).
    pub fn fill_price(&self, candle: &Candle) -> Option<f64> {
        match self.kind {
            OrderKind::Market => Some(candle.close()),
            OrderKind::Limit(price) => {
                if candle.low() <= price && price <= candle.high() {
                    Some(price)
                } else {
                    None
                }
            }
        }
    }

    /// A malformed intent (non-positive or non-finite quantity, non-finite
    /// or non-positive limit price) is not an error: the engine drops it
    /// silently and the run proceeds.
    pub fn is_well_formed(&self) -> bool {
        if !(self.quantity.is_finite() && self.quantity > 0.0) {
            return false;
        }
        if let OrderKind::Limit(price) = self.kind
            && !(price.is_finite() && price > 0.0)
        {
            return false;
        }
        true
    }
}
