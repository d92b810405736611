//! # Trend Following with a Trailing Stop
//!
//! Enters long when the close is above a slow EMA and lets a 3% trailing
//! stop manage the exit. With the `draws` feature enabled the run is saved
//! as an SVG chart with the equity curve overlaid.
mod utils;

use std::error::Error;

use candlesim::indicators::ema;
use candlesim::prelude::*;

const EMA_PERIOD: usize = 50;
const TRAIL: f64 = 0.03;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let candles = utils::generate_sample_candles(0..400, 3, 200.0);
    let initial_capital = 5_000.0;
    let mut backtest = Backtest::new(candles, initial_capital)?;

    let mut closes: Vec<f64> = Vec::new();
    let mut cooldown = 0usize;

    let report = backtest.run(&mut |candle: &Candle| {
        closes.push(candle.close());
        let Some(Some(trend)) = ema(&closes, EMA_PERIOD).last().copied() else {
            return Ok(None);
        };

        // The trailing stop does the selling; space entries out instead of
        // tracking open positions.
        if cooldown > 0 {
            cooldown -= 1;
            return Ok(None);
        }

        Ok(if candle.close() > trend {
            cooldown = 20;
            Some(OrderIntent::market_buy(5.0).trailing_stop(TRAIL))
        } else {
            None
        })
    })?;

    println!("trades {}", report.total_trades);
    println!("{}", report.metrics);

    #[cfg(feature = "draws")]
    {
        let options = DrawOptions::default()
            .title("Trailing Stop")
            .draw_output(DrawOutput::Svg("trailing_stop.svg"))
            .show_volume(true);
        Draw::with_backtest(&backtest)
            .with_report(&report)
            .with_options(options)
            .plot()?;
        println!("chart saved to trailing_stop.svg");
    }

    Ok(())
}
