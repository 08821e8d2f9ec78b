//! Price chart data and rendering
//!
//! [`ChartService`] fetches the bars for a timeframe and wraps them in a
//! [`PriceSeries`] carrying the 20-period rolling mean. The `render` module
//! draws a series as SVG (web) or as an RGB raster (PDF).

pub mod render;

pub use render::{ChartSize, RasterImage, render_message_svg, render_raster, render_svg};

use crate::error::Result;
use crate::market::{Bar, MarketDataSource};
use crate::symbol::{TickerSymbol, Timeframe};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use tracing::{debug, instrument, warn};

/// Rolling window of the overlay line
pub const SMA_PERIOD: usize = 20;

/// Bars of one symbol over one timeframe, with the SMA overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: TickerSymbol,
    pub timeframe: Timeframe,
    pub bars: Vec<Bar>,
    /// `None` until a full window of closes has been seen
    pub sma_20: Vec<Option<f64>>,
}

impl PriceSeries {
    pub fn new(symbol: TickerSymbol, timeframe: Timeframe, bars: Vec<Bar>) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let sma_20 = rolling_mean(&closes, SMA_PERIOD);
        Self {
            symbol,
            timeframe,
            bars,
            sma_20,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Lowest low and highest high, including the SMA line
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let lows = self.bars.iter().map(|b| b.low);
        let highs = self.bars.iter().map(|b| b.high);
        let sma = self.sma_20.iter().flatten().copied();

        let values: Vec<f64> = lows.chain(highs).chain(sma).filter(|v| v.is_finite()).collect();
        let min = values.iter().copied().reduce(f64::min)?;
        let max = values.iter().copied().reduce(f64::max)?;
        Some((min, max))
    }

    pub fn max_volume(&self) -> u64 {
        self.bars.iter().map(|b| b.volume).max().unwrap_or(0)
    }

    /// Latest SMA value, if a full window exists
    pub fn last_sma(&self) -> Option<f64> {
        self.sma_20.last().copied().flatten()
    }
}

/// Rolling mean of `values`; entries before the first full window are `None`
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let Ok(mut sma) = SimpleMovingAverage::new(period) else {
        return vec![None; values.len()];
    };
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let mean = sma.next(v);
            (i + 1 >= period).then_some(mean)
        })
        .collect()
}

/// What the chart pane should show
#[derive(Debug, Clone, PartialEq)]
pub enum ChartView {
    Ready(PriceSeries),
    /// The provider returned no bars for the window
    Empty { message: String },
    /// The fetch failed
    Unavailable { message: String },
}

impl ChartView {
    pub fn series(&self) -> Option<&PriceSeries> {
        match self {
            Self::Ready(series) => Some(series),
            Self::Empty { .. } | Self::Unavailable { .. } => None,
        }
    }

    /// Explanation shown instead of a chart
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Empty { message } | Self::Unavailable { message } => Some(message),
        }
    }
}

/// Fetches chart series on demand
#[derive(Clone)]
pub struct ChartService {
    source: Arc<dyn MarketDataSource>,
}

impl ChartService {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    /// Fetch the bars for `timeframe` and compute the overlay
    #[instrument(skip_all, fields(symbol = %symbol, timeframe = %timeframe))]
    pub async fn series(&self, symbol: &TickerSymbol, timeframe: Timeframe) -> Result<PriceSeries> {
        let bars = self.source.history(symbol, timeframe.window()).await?;
        debug!("Charting {} bars", bars.len());
        Ok(PriceSeries::new(symbol.clone(), timeframe, bars))
    }

    /// Like [`series`](Self::series) but folds empty results and errors into a view
    pub async fn view(&self, symbol: &TickerSymbol, timeframe: Timeframe) -> ChartView {
        match self.series(symbol, timeframe).await {
            Ok(series) if series.is_empty() => ChartView::Empty {
                message: format!("No price data available for {symbol} over {timeframe}."),
            },
            Ok(series) => ChartView::Ready(series),
            Err(e) => {
                warn!("Chart data unavailable for {symbol}: {e}");
                ChartView::Unavailable {
                    message: format!("Chart data unavailable for {symbol}: {}", e.user_message()),
                }
            },
        }
    }
}
