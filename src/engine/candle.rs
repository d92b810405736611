use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use chrono::serde::ts_milliseconds;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable OHLCV record for one time bucket.
///
/// The engine treats candles as read-only input: it assumes
/// `low <= {open, close} <= high` and non-decreasing timestamps across a
/// sequence but validates neither.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    #[cfg_attr(feature = "serde", serde(with = "ts_milliseconds"))]
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<(DateTime<Utc>, f64, f64, f64, f64, f64)> for Candle {
    fn from((timestamp, open, high, low, close, volume): (DateTime<Utc>, f64, f64, f64, f64, f64)) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl Candle {
    /// Returns the opening time of the bucket.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the opening price.
    pub fn open(&self) -> f64 {
        self.open
    }

    /// Returns the highest traded price.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Returns the lowest traded price.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Returns the closing price.
    pub fn close(&self) -> f64 {
        self.close
    }

    /// Returns the traded volume.
    pub fn volume(&self) -> f64 {
        self.volume
    }
}
