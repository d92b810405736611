mod backtest;
mod candle;
mod order;
mod position;
mod trade;

pub use backtest::{Backtest, Report, Strategy};
pub use candle::Candle;
pub use order::{Action, OrderIntent, OrderKind};
pub use position::{Position, PositionId, Side};
pub use trade::{ExitReason, Trade};
