/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong setting up or running a backtest. Rejected
/// orders are deliberately absent: the engine drops those silently.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The candle sequence provided to the engine is empty. A run requires at
    /// least one candle and fails before touching any engine state.
    #[error("Candle data is empty: a backtest requires at least one candle")]
    NoData,

    /// A candle source produced no data for the requested symbol/interval.
    #[error("No data available for {symbol} at interval {interval}")]
    DataUnavailable {
        /// Symbol that was requested.
        symbol: String,
        /// Interval that was requested.
        interval: String,
    },

    /// The initial capital is not positive. Trading requires positive capital.
    #[error("Initial capital must be positive (got: {0})")]
    NegZeroCapital(f64),

    /// An interval string could not be parsed (e.g. "7x").
    #[error("Unrecognized interval: {0}")]
    InvalidInterval(String),

    /// The strategy decision source failed. The run aborts immediately and no
    /// partial result is returned.
    #[error("Strategy error: {0}")]
    Strategy(String),

    /// I/O error occurred.
    #[cfg(feature = "serde")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error occurred.
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A chart could not be rendered.
    #[cfg(feature = "draws")]
    #[error("Plotters error: {0}")]
    Plotters(String),
}

impl Error {
    /// Wraps an arbitrary error raised inside a strategy.
    pub fn strategy(err: impl std::fmt::Display) -> Self {
        Self::Strategy(err.to_string())
    }
}
