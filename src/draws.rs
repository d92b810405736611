//! Module for visualizing backtest results and candle charts.

use crate::engine::{Backtest, Candle, Report};
use crate::errors::{Error, Result};

use chrono::Duration;
use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::WHITE;

/// Aspect ratio for the generated charts.
const ASPECT_RATIO: f64 = 0.5625;
/// Size of the X-axis labels.
const X_LABEL_SIZE: i32 = 20;
/// Size of the Y-axis labels.
const Y_LABEL_SIZE: i32 = 20;

/// Output formats for the generated charts with output filename.
pub enum DrawOutput {
    /// Save to the output SVG file.
    Svg(&'static str),
    /// Save to the output PNG file.
    Png(&'static str),
}

impl Default for DrawOutput {
    fn default() -> Self {
        Self::Svg("backtest.svg")
    }
}

/// Configuration options for chart generation.
#[derive(Default)]
pub struct DrawOptions {
    /// Chart title.
    title: Option<String>,
    /// Output format and path.
    output: DrawOutput,
    /// Whether to show the volume chart.
    show_volume: bool,
}

impl DrawOptions {
    /// Sets the chart title.
    pub fn title(mut self, title: impl ToString) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Sets the output format and path.
    pub fn draw_output(mut self, output: DrawOutput) -> Self {
        self.output = output;
        self
    }

    /// Enables or disables the volume chart.
    pub fn show_volume(mut self, show: bool) -> Self {
        self.show_volume = show;
        self
    }
}

/// Chart drawing utility for backtest visualization.
pub struct Draw<'d> {
    /// The backtest whose candle data is drawn.
    backtest: &'d Backtest,
    /// Report whose equity curve is overlaid on a secondary axis.
    report: Option<&'d Report>,
    /// Drawing options.
    options: DrawOptions,
}

impl<'d> Draw<'d> {
    /// Creates a new `Draw` instance with the given backtest.
    pub fn with_backtest(backtest: &'d Backtest) -> Self {
        Self {
            backtest,
            report: None,
            options: DrawOptions::default(),
        }
    }

    /// Overlays the report's equity curve on the price chart.
    pub fn with_report(mut self, report: &'d Report) -> Self {
        self.report = Some(report);
        self
    }

    /// Sets the drawing options.
    pub fn with_options(mut self, options: DrawOptions) -> Self {
        self.options = options;
        self
    }

    /// Generates and saves the chart based on the configured options.
    pub fn plot(&self) -> Result<()> {
        let candles = self.backtest.candles().collect::<Vec<_>>();
        if candles.is_empty() {
            return Err(Error::NoData);
        }

        let title = self.options.title.as_deref().unwrap_or("Backtest Chart");
        let height_factor = if self.options.show_volume { 1.4 } else { 1.0 };

        let candle_count = candles.len() as u32;
        let width = 1280.max(10 * candle_count);
        let height = ((width as f64 * ASPECT_RATIO * height_factor) as u32).min(900);

        match self.options.output {
            DrawOutput::Svg(path) => {
                let root = SVGBackend::new(path, (width, height)).into_drawing_area();
                root.fill(&WHITE).map_err(|e| Error::Plotters(e.to_string()))?;
                self.draw_chart(&root, &candles, title)
            }
            DrawOutput::Png(path) => {
                let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
                root.fill(&WHITE).map_err(|e| Error::Plotters(e.to_string()))?;
                self.draw_chart(&root, &candles, title)
            }
        }
    }

    /// Draws the price chart, with the volume pane below when enabled.
    fn draw_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        candles: &[&Candle],
        title: &str,
    ) -> Result<()> {
        let total_height = drawing_area.dim_in_pixel().1 as f64;
        let volume_height = if self.options.show_volume {
            total_height * 0.2
        } else {
            0.0
        };
        let price_height = total_height - volume_height;

        let (price_area, volume_area) = if self.options.show_volume {
            drawing_area.split_vertically(price_height as u32)
        } else {
            (drawing_area.clone(), drawing_area.clone())
        };

        self.draw_price_chart(&price_area, candles, title)?;
        if self.options.show_volume {
            self.draw_volume_chart(&volume_area, candles)?;
        }

        drawing_area.present().map_err(|e| Error::Plotters(e.to_string()))
    }

    /// Draws the candlesticks and, when a report is attached, its equity
    /// curve on the secondary axis.
    fn draw_price_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        candles: &[&Candle],
        title: &str,
    ) -> Result<()> {
        let min_price = candles.iter().map(|c| c.low()).fold(f64::INFINITY, f64::min);
        let max_price = candles.iter().map(|c| c.high()).fold(f64::NEG_INFINITY, f64::max);
        let first_time = candles.first().ok_or(Error::NoData)?.timestamp();
        let last_time = candles.last().ok_or(Error::NoData)?.timestamp();
        let price_range = max_price - min_price;
        let price_padding = price_range * 0.1;

        // Equity sample i + 1 belongs to candle i; sample 0 is the pre-run
        // seed and has no candle.
        let equity: Vec<_> = self
            .report
            .map(|report| {
                report
                    .equity_curve
                    .iter()
                    .skip(1)
                    .zip(candles)
                    .map(|(value, candle)| (candle.timestamp(), *value))
                    .collect()
            })
            .unwrap_or_default();

        let (min_equity, max_equity) = if equity.is_empty() {
            (0.0, 0.0)
        } else {
            (
                equity.iter().map(|(_, e)| *e).fold(f64::INFINITY, f64::min),
                equity.iter().map(|(_, e)| *e).fold(f64::NEG_INFINITY, f64::max),
            )
        };

        let (top, bottom) = if self.options.show_volume { (0, 0) } else { (10, 10) };
        let drawing_area = drawing_area.margin(top, bottom, 70, 70);
        let mut builder = ChartBuilder::on(&drawing_area);
        if !self.options.show_volume {
            builder.x_label_area_size(X_LABEL_SIZE);
        }

        let mut chart = builder
            .caption(title, ("sans-serif", 30).into_font())
            .y_label_area_size(Y_LABEL_SIZE)
            .right_y_label_area_size(Y_LABEL_SIZE)
            .build_cartesian_2d(
                first_time..last_time,
                min_price - price_padding..max_price + price_padding,
            )
            .map_err(|e| Error::Plotters(e.to_string()))?
            .set_secondary_coord(first_time..last_time, min_equity..max_equity);

        if !equity.is_empty() {
            chart
                .configure_secondary_axes()
                .y_desc("Equity")
                .label_style(("sans-serif", Y_LABEL_SIZE))
                .y_labels(5)
                .draw()
                .map_err(|e| Error::Plotters(e.to_string()))?;
        }

        let candle_count = candles.len();
        let x_labels = candle_count / 15;

        {
            let mut mesh = chart.configure_mesh();
            mesh.y_desc("Price")
                .y_label_style(("sans-serif", Y_LABEL_SIZE))
                .y_labels(5);

            if self.options.show_volume {
                mesh.disable_x_axis();
            } else {
                mesh.x_desc("Time")
                    .x_label_style(("sans-serif", X_LABEL_SIZE))
                    .x_labels(x_labels);
            }

            mesh.draw().map_err(|e| Error::Plotters(e.to_string()))?;
        }

        let candle_width = {
            let total_width = drawing_area.dim_in_pixel().0 as f64;
            let available_width = total_width - (X_LABEL_SIZE * 2) as f64;
            (available_width / candle_count as f64).max(5.0) as u32
        };

        chart
            .draw_series(candles.iter().map(|c| {
                let color = if c.close() >= c.open() { GREEN.filled() } else { RED.filled() };
                CandleStick::new(c.timestamp(), c.open(), c.high(), c.low(), c.close(), color, color, candle_width)
            }))
            .map_err(|e| Error::Plotters(e.to_string()))?;

        if let Some(report) = self.report {
            let initial_capital = report.initial_capital;
            let gains = equity.iter().filter(|(_, e)| *e >= initial_capital).copied();
            let losses = equity.iter().filter(|(_, e)| *e < initial_capital).copied();

            chart
                .draw_secondary_series(LineSeries::new(gains, BLUE))
                .map_err(|e| Error::Plotters(e.to_string()))?;
            chart
                .draw_secondary_series(LineSeries::new(losses, RED))
                .map_err(|e| Error::Plotters(e.to_string()))?;
        }

        Ok(())
    }

    /// Draws the volume chart.
    fn draw_volume_chart<DB: DrawingBackend>(
        &self,
        drawing_area: &DrawingArea<DB, Shift>,
        candles: &[&Candle],
    ) -> Result<()> {
        let max_volume = candles.iter().map(|c| c.volume()).fold(f64::NEG_INFINITY, f64::max);
        let volume_padding = max_volume * 0.1;
        let first_time = candles.first().ok_or(Error::NoData)?.timestamp();
        let last_time = candles.last().ok_or(Error::NoData)?.timestamp();
        let bar_width = match candles {
            [first, second, ..] => second.timestamp() - first.timestamp(),
            _ => Duration::days(1),
        };
        let drawing_area = drawing_area.margin(0, 10, 70, 70);

        let mut chart = ChartBuilder::on(&drawing_area)
            .x_label_area_size(X_LABEL_SIZE)
            .y_label_area_size(Y_LABEL_SIZE)
            .build_cartesian_2d(first_time..last_time, 0.0..max_volume + volume_padding)
            .map_err(|e| Error::Plotters(e.to_string()))?;

        let candle_count = candles.len();
        let x_labels = candle_count / 15;

        chart
            .configure_mesh()
            .x_desc("Time")
            .x_label_style(("sans-serif", X_LABEL_SIZE))
            .y_label_style(("sans-serif", Y_LABEL_SIZE))
            .x_labels(x_labels)
            .y_labels(3)
            .draw()
            .map_err(|e| Error::Plotters(e.to_string()))?;

        chart
            .draw_series(candles.iter().map(|c| {
                let x = c.timestamp();
                let color = if c.close() >= c.open() {
                    GREEN.mix(0.3)
                } else {
                    RED.mix(0.3)
                };
                Rectangle::new([(x, 0.0), (x + bar_width, c.volume())], color.filled())
            }))
            .map(|_| ())
            .map_err(|e| Error::Plotters(e.to_string()))
    }
}
