use std::ops::Range;

use candlesim::prelude::*;
use chrono::{DateTime, Duration};

/// Generates deterministic candle data.
pub fn generate_sample_candles(range: Range<i32>, seed: i32, base_price: f64) -> Vec<Candle> {
    let mut timestamp = DateTime::from_timestamp_secs(1515151515).unwrap();

    range
        .map(|i| {
            // Base price with trend (+ 0.5*i)
            let trend = base_price + 0.5 * (i as f64);

            // Price variation using simple trigonometric function with seed
            let variation = 5.0 * ((i as f64 * 0.3 + seed as f64).sin() * 0.5 + 0.5);

            let close = trend + variation;
            let open = if i == 0 { close - 1.0 } else { close - 0.5 * variation };
            // Keep the range valid: low ≤ open/close ≤ high
            let high = (close + 0.3 * variation.abs()).max(open);
            let low = (close - 0.3 * variation.abs()).min(open);
            // Volume with seasonal pattern
            let volume = 1000.0 + 500.0 * ((i as f64 * 0.2).sin()).abs();

            let candle = Candle::from((timestamp, open, high, low, close, volume));
            timestamp += Duration::hours(1);
            candle
        })
        .collect()
}
