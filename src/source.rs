//! Candle acquisition: the [`CandleSource`] seam the engine consumes data
//! through, a deterministic synthetic source for development, and a JSON
//! file loader behind the `serde` feature.

use chrono::{DateTime, Duration, Utc};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::Candle;
use crate::errors::{Error, Result};

/// What to fetch: a symbol, a candle interval, and optional bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    symbol: String,
    interval: String,
    limit: Option<usize>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
}

impl DataRequest {
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            limit: None,
            start_time: None,
            end_time: None,
        }
    }

    /// Caps the number of candles returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Excludes candles before `start_time`.
    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Anchors the newest candle at `end_time` instead of the wall clock.
    pub fn end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Returns the requested symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the requested interval string.
    pub fn interval(&self) -> &str {
        &self.interval
    }

    /// Returns the requested candle cap, if any.
    pub fn limit_hint(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the inclusive lower time bound, if any.
    pub fn start_bound(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Returns the anchor for the newest candle, if any.
    pub fn end_bound(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }
}

impl From<(&str, &str)> for DataRequest {
    fn from((symbol, interval): (&str, &str)) -> Self {
        Self::new(symbol, interval)
    }
}

/// A provider of historical candles.
///
/// Implementations must return candles in ascending timestamp order and
/// report an empty result as [`Error::DataUnavailable`] rather than an
/// empty vector, so a backtest never silently runs over nothing.
pub trait CandleSource {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Fetches the candles described by `request`.
    fn fetch(&mut self, request: &DataRequest) -> Result<Vec<Candle>>;
}

/// Parses an interval string such as `"5m"`, `"1h"` or `"1d"` into a
/// duration. Returns [`Error::InvalidInterval`] for anything else.
pub fn parse_interval(interval: &str) -> Result<Duration> {
    let invalid = || Error::InvalidInterval(interval.to_owned());

    let (digits, unit) = interval.split_at(interval.len().saturating_sub(1));
    let count: i64 = digits.parse().map_err(|_| invalid())?;
    if count <= 0 {
        return Err(invalid());
    }

    match unit {
        "m" => Ok(Duration::minutes(count)),
        "h" => Ok(Duration::hours(count)),
        "d" => Ok(Duration::days(count)),
        _ => Err(invalid()),
    }
}

/// Synthetic candle source: a seeded random walk around a base price, for
/// development and tests without market data. The same seed and request
/// always produce the same series (anchor the end time for bit-identical
/// timestamps too).
#[derive(Debug, Clone)]
pub struct PaperSource {
    rng: StdRng,
    base_price: f64,
}

impl PaperSource {
    const DEFAULT_LIMIT: usize = 100;

    pub fn new(seed: u64) -> Self {
        Self::with_base_price(seed, 50_000.0)
    }

    pub fn with_base_price(seed: u64, base_price: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price,
        }
    }

    fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }
}

impl CandleSource for PaperSource {
    fn name(&self) -> &str {
        "paper"
    }

    fn fetch(&mut self, request: &DataRequest) -> Result<Vec<Candle>> {
        let limit = request.limit.unwrap_or(Self::DEFAULT_LIMIT);
        let step = parse_interval(&request.interval)?;
        let end = request.end_time.unwrap_or_else(Utc::now);

        debug!("generating {limit} synthetic candles for {}", request.symbol);

        let mut candles = Vec::with_capacity(limit);
        for i in 0..limit {
            let timestamp = end - step * (limit - i - 1) as i32;

            // Random walk: drift the base, then scatter OHLC around it.
            let drift: f64 = self.rng.random_range(-0.02..=0.02);
            self.base_price *= 1.0 + drift;

            let open = self.base_price;
            let close = open * self.rng.random_range(0.98..=1.02);
            let high = open.max(close) * self.rng.random_range(1.0..=1.01);
            let low = open.min(close) * self.rng.random_range(0.99..=1.0);
            let volume = self.rng.random_range(100.0..=1_000.0);

            candles.push(Candle::from((
                timestamp,
                Self::round2(open),
                Self::round2(high),
                Self::round2(low),
                Self::round2(close),
                Self::round2(volume),
            )));
            self.base_price = close;
        }

        if let Some(start) = request.start_time {
            candles.retain(|candle| candle.timestamp() >= start);
        }

        if candles.is_empty() {
            return Err(Error::DataUnavailable {
                symbol: request.symbol.clone(),
                interval: request.interval.clone(),
            });
        }
        Ok(candles)
    }
}

/// Loads candles from a JSON file holding an array of OHLCV objects with
/// millisecond epoch timestamps.
#[cfg(feature = "serde")]
pub fn candles_from_file(path: impl AsRef<std::path::Path>) -> Result<Vec<Candle>> {
    let contents = std::fs::read_to_string(path)?;
    let candles: Vec<Candle> = serde_json::from_str(&contents)?;
    if candles.is_empty() {
        return Err(Error::NoData);
    }
    Ok(candles)
}
