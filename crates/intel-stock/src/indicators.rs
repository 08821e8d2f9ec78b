//! MACD and Bollinger Band readings for a bar series

use crate::error::{Result, StockError};
use crate::market::Bar;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::{BollingerBands, MovingAverageConvergenceDivergence};

/// Bars needed before the readings are meaningful
pub const MIN_BARS: usize = 30;

const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const BB_PERIOD: usize = 20;
const BB_STD_DEV: f64 = 2.0;

/// Latest MACD (12/26/9) values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl MacdReading {
    /// MACD line above its signal line
    pub fn is_bullish(&self) -> bool {
        self.macd > self.signal
    }
}

/// Latest Bollinger Band (20, 2 sigma) values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerReading {
    /// Position of `price` within the bands: 0 at the lower band, 1 at the upper
    pub fn percent_b(&self, price: f64) -> Option<f64> {
        let width = self.upper - self.lower;
        (width > f64::EPSILON).then(|| (price - self.lower) / width)
    }
}

/// Indicator values at the last bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub last_close: f64,
    pub macd: MacdReading,
    pub bollinger: BollingerReading,
}

/// Result of an indicator run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndicatorReading {
    Ready(IndicatorSnapshot),
    Insufficient { bars: usize, required: usize },
}

/// Run MACD and Bollinger Bands over the closes of `bars`
pub fn compute_indicators(bars: &[Bar]) -> Result<IndicatorReading> {
    if bars.len() < MIN_BARS {
        return Ok(IndicatorReading::Insufficient {
            bars: bars.len(),
            required: MIN_BARS,
        });
    }

    let indicator_err = |e: ta::errors::TaError| StockError::Config(format!("indicator setup: {e}"));
    let mut macd = MovingAverageConvergenceDivergence::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL)
        .map_err(indicator_err)?;
    let mut bands = BollingerBands::new(BB_PERIOD, BB_STD_DEV).map_err(indicator_err)?;

    let mut last = None;
    for bar in bars {
        let m = macd.next(bar.close);
        let b = bands.next(bar.close);
        last = Some(IndicatorSnapshot {
            last_close: bar.close,
            macd: MacdReading {
                macd: m.macd,
                signal: m.signal,
                histogram: m.histogram,
            },
            bollinger: BollingerReading {
                upper: b.upper,
                middle: b.average,
                lower: b.lower,
            },
        });
    }

    Ok(last.map_or(
        IndicatorReading::Insufficient {
            bars: 0,
            required: MIN_BARS,
        },
        IndicatorReading::Ready,
    ))
}
