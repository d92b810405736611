//! # SMA Crossover Strategy
//!
//! Buys when the close crosses above its moving average and sells when it
//! crosses back below, then compares the result against buy-and-hold.
mod utils;

use std::error::Error;

use candlesim::indicators::sma;
use candlesim::prelude::*;

const SMA_PERIOD: usize = 20;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let candles = utils::generate_sample_candles(0..500, 7, 100.0);
    let initial_capital = 10_000.0;
    let mut backtest = Backtest::new(candles.clone(), initial_capital)?;

    let mut closes: Vec<f64> = Vec::new();
    let mut long = false;

    let report = backtest.run(&mut |candle: &Candle| {
        closes.push(candle.close());
        let Some(Some(average)) = sma(&closes, SMA_PERIOD).last().copied() else {
            return Ok(None);
        };

        Ok(if !long && candle.close() > average {
            long = true;
            Some(OrderIntent::market_buy(10.0))
        } else if long && candle.close() < average {
            long = false;
            Some(OrderIntent::market_sell(10.0))
        } else {
            None
        })
    })?;

    println!("trades {}", report.total_trades);
    println!("{}", report.metrics);

    let first_price = candles.first().unwrap().close();
    let last_price = candles.last().unwrap().close();
    let buy_and_hold = (initial_capital / first_price) * last_price;
    let buy_and_hold_perf = (last_price - first_price) / first_price * 100.0;
    println!("strategy     {:.2}", report.final_capital);
    println!("buy and hold {buy_and_hold:.2} ({buy_and_hold_perf:.2}%)");

    Ok(())
}
