//! # Parameter Optimization
//!
//! Sweeps an SMA crossover strategy over a grid of lookback periods and
//! trailing-stop widths in parallel, then prints the best combination.
//!
//! Run with: `cargo run --example popt --features optimizer`
mod utils;

use std::error::Error;

use candlesim::indicators::sma;
use candlesim::prelude::*;

struct Grid;

impl ParameterCombination for Grid {
    type Output = (usize, f64);

    fn generate() -> Vec<Self::Output> {
        (5..=40)
            .step_by(5)
            .flat_map(|period| [0.01, 0.02, 0.03, 0.05].map(move |trail| (period, trail)))
            .collect()
    }
}

struct SmaTrail {
    period: usize,
    trail: f64,
    closes: Vec<f64>,
    cooldown: usize,
}

impl Strategy for SmaTrail {
    fn on_candle(&mut self, candle: &Candle) -> candlesim::errors::Result<Option<OrderIntent>> {
        self.closes.push(candle.close());
        let Some(Some(average)) = sma(&self.closes, self.period).last().copied() else {
            return Ok(None);
        };

        if self.cooldown > 0 {
            self.cooldown -= 1;
            return Ok(None);
        }

        Ok(if candle.close() > average {
            self.cooldown = self.period;
            Some(OrderIntent::market_buy(5.0).trailing_stop(self.trail))
        } else {
            None
        })
    }
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let candles = utils::generate_sample_candles(0..600, 11, 150.0);
    let optimizer = Optimizer::<Grid>::new(candles, 10_000.0);

    let mut results = optimizer.with(|&(period, trail)| {
        Ok(SmaTrail {
            period,
            trail,
            closes: Vec::new(),
            cooldown: 0,
        })
    })?;

    results.sort_by(|(_, a), (_, b)| b.final_capital.total_cmp(&a.final_capital));

    println!("{} combinations tested", results.len());
    for ((period, trail), report) in results.iter().take(5) {
        println!(
            "sma {period:>2} trail {:>4.1}% -> {:.2} ({} trades)",
            trail * 100.0,
            report.final_capital,
            report.total_trades
        );
    }

    let ((period, trail), best) = &results[0];
    println!("\nbest: sma {period} / trail {:.1}%", trail * 100.0);
    println!("{}", best.metrics);

    Ok(())
}
