//! Technical indicators over price series.
//!
//! Every function is pure and returns a vector exactly as long as its input,
//! with `None` marking positions where the lookback window is not yet full.
//! Insufficient history (or a zero period) is never an error: the whole
//! output is `None` and the caller's alignment with the candle series still
//! holds. Multi-series indicators expect all inputs to have equal length.

/// Simple moving average over the last `period` values.
pub fn sma(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || prices.len() < period {
        return vec![None; prices.len()];
    }

    (0..prices.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                Some(prices[i + 1 - period..=i].iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

/// Exponential moving average, seeded with the SMA of the first `period`
/// values and smoothed with `k = 2 / (period + 1)`.
pub fn ema(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || prices.len() < period {
        return vec![None; prices.len()];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut out: Vec<Option<f64>> = vec![None; period - 1];

    let mut current = prices[..period].iter().sum::<f64>() / period as f64;
    out.push(Some(current));

    for &price in &prices[period..] {
        current = (price - current) * multiplier + current;
        out.push(Some(current));
    }
    out
}

/// Relative strength index over a plain rolling window of the last `period`
/// price changes (gains and losses both averaged over `period`, not over
/// their own counts). Reads 100 when the window has no losses.
pub fn rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || prices.len() < period + 1 {
        return vec![None; prices.len()];
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let mut out: Vec<Option<f64>> = vec![None; period];

    for window in changes.windows(period) {
        let avg_gain = window.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
        let avg_loss = -window.iter().filter(|c| **c < 0.0).sum::<f64>() / period as f64;

        let value = if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
        out.push(Some(value));
    }
    out
}

/// The three MACD series, index-aligned with the input prices.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    /// Fast EMA minus slow EMA.
    pub macd: Vec<Option<f64>>,
    /// EMA of the MACD line.
    pub signal: Vec<Option<f64>>,
    /// MACD line minus signal line.
    pub histogram: Vec<Option<f64>>,
}

/// Moving average convergence/divergence. The signal line is the EMA of the
/// defined prefix of the MACD line, left-padded so all three series stay
/// aligned with `prices`.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let n = prices.len();
    if fast == 0 || slow == 0 || signal == 0 || n < slow {
        return Macd {
            macd: vec![None; n],
            signal: vec![None; n],
            histogram: vec![None; n],
        };
    }

    let fast_ema = ema(prices, fast);
    let slow_ema = ema(prices, slow);
    let macd_line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|pair| match pair {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let defined: Vec<f64> = macd_line.iter().flatten().copied().collect();
    let signal_tail = ema(&defined, signal);
    let mut signal_line: Vec<Option<f64>> = vec![None; n - signal_tail.len()];
    signal_line.extend(signal_tail);

    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|pair| match pair {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    Macd { macd: macd_line, signal: signal_line, histogram }
}

/// Bollinger band triple, index-aligned with the input prices.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    /// Middle band plus the deviation offset.
    pub upper: Vec<Option<f64>>,
    /// The SMA the bands are centered on.
    pub middle: Vec<Option<f64>>,
    /// Middle band minus the deviation offset.
    pub lower: Vec<Option<f64>>,
}

/// Bollinger bands: SMA center with `std_dev` population standard
/// deviations on either side.
pub fn bollinger_bands(prices: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    let n = prices.len();
    if period == 0 || n < period {
        return BollingerBands {
            upper: vec![None; n],
            middle: vec![None; n],
            lower: vec![None; n],
        };
    }

    let middle = sma(prices, period);
    let mut upper = Vec::with_capacity(n);
    let mut lower = Vec::with_capacity(n);

    for (i, mean) in middle.iter().enumerate() {
        match mean {
            Some(mean) => {
                let window = &prices[i + 1 - period..=i];
                let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
                let offset = std_dev * variance.sqrt();
                upper.push(Some(mean + offset));
                lower.push(Some(mean - offset));
            }
            None => {
                upper.push(None);
                lower.push(None);
            }
        }
    }

    BollingerBands { upper, middle, lower }
}

/// Average true range: a plain rolling mean of the true range, which needs a
/// previous close and therefore starts one candle late. Defined from index
/// `period` onward.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = highs.len();
    if period == 0 || n < period + 1 || lows.len() != n || closes.len() != n {
        return vec![None; n];
    }

    let true_ranges: Vec<f64> = (1..n)
        .map(|i| {
            let hl = highs[i] - lows[i];
            let hc = (highs[i] - closes[i - 1]).abs();
            let lc = (lows[i] - closes[i - 1]).abs();
            hl.max(hc).max(lc)
        })
        .collect();

    let mut out: Vec<Option<f64>> = vec![None; period];
    for window in true_ranges.windows(period) {
        out.push(Some(window.iter().sum::<f64>() / period as f64));
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Trend {
    Up,
    Down,
}

/// Supertrend line: ATR bands around the candle midpoint, with the final
/// bands only allowed to tighten while the prior close stays inside them.
/// The emitted value is the upper band while the trend is down and the
/// lower band while it is up; a close crossing the opposite band flips the
/// trend. Defined from index `period` onward.
pub fn supertrend(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    multiplier: f64,
) -> Vec<Option<f64>> {
    let n = highs.len();
    if period == 0 || n < period + 1 || lows.len() != n || closes.len() != n {
        return vec![None; n];
    }

    // ATR is fully defined from index `period` on, given the guard above.
    let atr_tail: Vec<f64> = atr(highs, lows, closes, period).into_iter().flatten().collect();

    let mut final_upper: Vec<f64> = Vec::with_capacity(n - period);
    let mut final_lower: Vec<f64> = Vec::with_capacity(n - period);
    for (offset, i) in (period..n).enumerate() {
        let hl_avg = (highs[i] + lows[i]) / 2.0;
        let basic_upper = hl_avg + multiplier * atr_tail[offset];
        let basic_lower = hl_avg - multiplier * atr_tail[offset];

        if offset == 0 {
            final_upper.push(basic_upper);
            final_lower.push(basic_lower);
        } else {
            let prev_close = closes[i - 1];
            let prev_upper = final_upper[offset - 1];
            let prev_lower = final_lower[offset - 1];

            final_upper.push(if prev_close <= prev_upper {
                basic_upper.min(prev_upper)
            } else {
                basic_upper
            });
            final_lower.push(if prev_close >= prev_lower {
                basic_lower.max(prev_lower)
            } else {
                basic_lower
            });
        }
    }

    let mut out: Vec<Option<f64>> = vec![None; period];
    let mut trend: Option<Trend> = None;
    for (offset, i) in (period..n).enumerate() {
        let close = closes[i];
        let upper = final_upper[offset];
        let lower = final_lower[offset];

        let value = match trend {
            None => {
                if close <= upper {
                    trend = Some(Trend::Down);
                    upper
                } else {
                    trend = Some(Trend::Up);
                    lower
                }
            }
            Some(Trend::Down) => {
                if close > upper {
                    trend = Some(Trend::Up);
                    lower
                } else {
                    upper
                }
            }
            Some(Trend::Up) => {
                if close < lower {
                    trend = Some(Trend::Down);
                    upper
                } else {
                    lower
                }
            }
        };
        out.push(Some(value));
    }
    out
}
