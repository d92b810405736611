//! Strategy parameter optimization.
//!
//! Runs one backtest per parameter combination across a thread pool. The
//! `ParameterCombination` trait describes the grid to sweep; a factory
//! closure builds a fresh strategy for each combination so strategy state
//! never leaks between runs.

use std::marker::PhantomData;

use rayon::prelude::*;

use crate::engine::{Backtest, Candle, Report, Strategy};
use crate::errors::Result;

/// Trait defining how to generate parameter combinations for optimization.
///
/// The associated type `Output` represents a single combination, typically
/// a tuple of values.
pub trait ParameterCombination: Sync {
    /// Type representing a single parameter combination (e.g. `(usize, f64)`).
    type Output: Clone + Send + Sync;

    /// Generates all parameter combinations to test.
    fn generate() -> Vec<Self::Output>;
}

/// Sweeps a strategy over every combination of a parameter grid, one full
/// backtest each, and collects the resulting reports.
pub struct Optimizer<PC: ParameterCombination> {
    data: Vec<Candle>,
    initial_capital: f64,
    _marker: PhantomData<PC>,
}

impl<PC: ParameterCombination> From<&Backtest> for Optimizer<PC> {
    fn from(value: &Backtest) -> Self {
        Self {
            data: value.candles().copied().collect(),
            initial_capital: value.initial_capital(),
            _marker: PhantomData,
        }
    }
}

impl<PC: ParameterCombination> Optimizer<PC> {
    /// Creates a new `Optimizer` over `data` with `initial_capital` per run.
    pub fn new(data: Vec<Candle>, initial_capital: f64) -> Self {
        Self {
            data,
            initial_capital,
            _marker: PhantomData,
        }
    }

    /// Backtests every combination from [`ParameterCombination::generate`],
    /// building a fresh strategy per combination via `factory`.
    ///
    /// Combinations are split into one chunk per logical CPU and the chunks
    /// run in parallel, each on its own engine. Results come back in
    /// generation order.
    ///
    /// ### Errors
    /// The first engine or strategy error aborts the whole sweep.
    pub fn with<S, F>(&self, factory: F) -> Result<Vec<(PC::Output, Report)>>
    where
        S: Strategy,
        F: Fn(&PC::Output) -> Result<S> + Sync,
    {
        let combinations = PC::generate();
        let chunk_size = combinations.len().div_ceil(num_cpus::get()).max(1);

        combinations
            .par_chunks(chunk_size)
            .map::<_, Result<_>>(|chunk| {
                let mut backtest = Backtest::new(self.data.clone(), self.initial_capital)?;
                let mut local_results = Vec::with_capacity(chunk.len());

                for params in chunk {
                    let mut strategy = factory(params)?;
                    let report = backtest.run(&mut strategy)?;
                    local_results.push((params.clone(), report));
                }

                Ok(local_results)
            })
            .collect::<Result<Vec<_>>>()
            .map(|chunks| chunks.into_iter().flatten().collect())
    }
}
