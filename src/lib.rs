//! # Candlesim: Strategy Backtesting on Candlestick Data
//!
//! **Candlesim** is a Rust library for backtesting trading strategies on candlestick
//! (OHLCV) data. It replays a strategy candle by candle against a deterministic
//! engine: same data, same strategy, same report, every time.
//!
//! ## Why Candlesim?
//! - **Deterministic**: candles are immutable, positions live in an ordered arena,
//!   and replaying a run is bit-identical.
//! - **Risk Management**: stop-loss, take-profit, and tighten-only trailing stops
//!   per position.
//! - **Batteries Included**: an indicator library (SMA, EMA, RSI, MACD, Bollinger,
//!   ATR, Supertrend), performance metrics, and a synthetic data source.
//! - **Extensible**: bring your own strategies and candle sources through small traits.
//!
//! ## Core Components
//! | Component   | Description                                                                 |
//! |-------------|------------------------------------------------------------------------------|
//! | **`Candle`** | OHLCV (Open, High, Low, Close, Volume) data for a single time period.       |
//! | **`OrderIntent`** | A market or limit order with optional stop-loss, take-profit, trailing stop. |
//! | **`Position`** | An open trade with its risk parameters and water marks.                    |
//! | **`Trade`** | A closed trade: prices, pnl, exit reason, holding time.                      |
//! | **`Metrics`** | Performance metrics: return, drawdown, Sharpe ratio, win rate, and more.   |
//! | **`Optimizer`** | Sweeps strategy parameters across a thread pool.                          |
//! | **`Backtest`** | The engine that simulates strategy execution over historical data.         |
//!
//! ## Order Types & Exit Rules
//! | Order Type               | Description                                                     |
//! |--------------------------|------------------------------------------------------------------|
//! | **Market Order**         | Fills at the current candle's close.                            |
//! | **Limit Order**          | Fills at the limit price if the candle's range touches it.      |
//! | **Take-Profit**          | Closes the position when a target price is reached.             |
//! | **Stop-Loss**            | Closes the position to limit losses; wins ties with the target. |
//! | **Trailing Stop**        | Ratchets the stop behind the best price seen, never loosening.  |
//!
//! ## Getting Started
//! ```rust
//! use candlesim::prelude::*;
//!
//! // Deterministic synthetic data: same seed, same candles.
//! let mut source = PaperSource::new(42);
//! let request = DataRequest::new("BTCUSDT", "1h").limit(200);
//! let candles = source.fetch(&request).unwrap();
//!
//! let mut backtest = Backtest::new(candles, 100_000.0).unwrap();
//!
//! // Buy the first green candle, ride a 2% trailing stop.
//! let mut long = false;
//! let report = backtest
//!     .run(&mut |candle: &Candle| {
//!         Ok(if !long && candle.close() > candle.open() {
//!             long = true;
//!             Some(OrderIntent::market_buy(0.5).trailing_stop(0.02))
//!         } else {
//!             None
//!         })
//!     })
//!     .unwrap();
//!
//! println!("{}", report.metrics);
//! assert_eq!(report.equity_curve.len(), 201);
//! ```
//!
//! ## Integrations
//! | Crate          | Purpose                                             |
//! |----------------|------------------------------------------------------|
//! | [`rayon`](https://crates.io/crates/rayon) | Parallel processing for optimization (feature `optimizer`). |
//! | [`serde`](https://crates.io/crates/serde) | Serialize/deserialize candles and reports (feature `serde`). |
//! | [`plotters`](https://crates.io/crates/plotters) | Visualize candlesticks, volume, and equity curves (feature `draws`). |
//!
//! ## Error Handling
//! Construction fails fast on empty data or non-positive capital; strategy
//! errors abort the run. Rejected orders are not errors: an unfillable limit,
//! an unaffordable buy, or a sell with nothing to close is silently dropped
//! and the run continues.
//!
//! ```rust
//! use candlesim::prelude::*;
//!
//! let result = Backtest::new(Vec::<Candle>::new(), 10_000.0);
//! assert!(matches!(result, Err(Error::NoData)));
//! ```
//!
//! ## License
//! MIT
#![warn(missing_docs)]

/// Core trading engine components: candles, orders, positions, trades, and
/// the backtest loop.
pub mod engine;

/// Error types for the library.
pub mod errors;

/// Technical indicators: SMA, EMA, RSI, MACD, Bollinger bands, ATR, Supertrend.
pub mod indicators;

/// Performance metrics: return, drawdown, Sharpe ratio, win rate, etc.
pub mod metrics;

/// Candle sources: the `CandleSource` trait, a synthetic paper source, and
/// interval parsing.
pub mod source;

/// Strategy parameter optimization.
#[cfg(feature = "optimizer")]
pub mod optimizer;

/// Draw candlestick, volume, and equity charts to SVG or PNG.
#[cfg(feature = "draws")]
pub mod draws;

/// Re-exports of commonly used types and traits for convenience.
pub mod prelude {
    pub use crate::engine::*;
    pub use crate::errors::*;
    pub use crate::metrics::*;
    pub use crate::source::*;

    #[cfg(feature = "optimizer")]
    pub use crate::optimizer::*;

    #[cfg(feature = "draws")]
    pub use crate::draws::*;
}
