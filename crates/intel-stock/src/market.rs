//! Market data: price history, headline statistics and the trend label

use crate::error::{Result, StockError};
use crate::symbol::{HistoryWindow, TickerSymbol};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// One OHLCV record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// True when the bar closed at or above its open
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Source of historical price bars
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the bars covering `window`, oldest first
    async fn history(&self, symbol: &TickerSymbol, window: HistoryWindow) -> Result<Vec<Bar>>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Technical trend label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Bullish only when the price is strictly above the moving average
    pub fn from_levels(price: Decimal, ma_20: Decimal) -> Self {
        if price > ma_20 {
            Self::Bullish
        } else {
            Self::Bearish
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "Bullish",
            Self::Bearish => "Bearish",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline statistics for one symbol.
///
/// Values are rounded to cents and the trend is derived from the rounded
/// values, so `trend == Bullish` exactly when `price > ma_20` as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockStats {
    pub symbol: TickerSymbol,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ma_20: Decimal,
    pub trend: Trend,
}

impl StockStats {
    /// Build a record from raw levels, rounding both to two decimals
    pub fn new(symbol: TickerSymbol, price: Decimal, ma_20: Decimal) -> Self {
        let price = price.round_dp(2);
        let ma_20 = ma_20.round_dp(2);
        Self {
            symbol,
            price,
            ma_20,
            trend: Trend::from_levels(price, ma_20),
        }
    }

    /// Signed distance of the price from its moving average
    pub fn ma_gap(&self) -> Decimal {
        self.price - self.ma_20
    }
}

/// Either the statistics or a user-facing error, never both.
///
/// Serializes untagged so consumers see `{"symbol","price","ma_20","trend"}`
/// or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsOutcome {
    Stats(StockStats),
    Error { error: String },
}

impl StatsOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn stats(&self) -> Option<&StockStats> {
        match self {
            Self::Stats(stats) => Some(stats),
            Self::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Stats(_) => None,
            Self::Error { error } => Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Compact JSON used when embedding the outcome in prompts
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Compute statistics from a window of bars.
///
/// `price` is the last close, `ma_20` the mean of every close in the window.
pub fn compute_stats(symbol: &TickerSymbol, bars: &[Bar]) -> Result<StockStats> {
    let closes: Vec<f64> = bars
        .iter()
        .map(|bar| bar.close)
        .filter(|close| close.is_finite())
        .collect();

    let Some(&last) = closes.last() else {
        return Err(StockError::EmptyResult {
            symbol: symbol.to_string(),
            what: "price history".to_string(),
        });
    };
    let mean = closes.iter().sum::<f64>() / closes.len() as f64;

    Ok(StockStats::new(
        symbol.clone(),
        to_decimal(last, "closing price")?,
        to_decimal(mean, "moving average")?,
    ))
}

fn to_decimal(value: f64, what: &str) -> Result<Decimal> {
    Decimal::from_f64_retain(value).ok_or_else(|| StockError::Parse {
        what: what.to_string(),
        reason: format!("{value} is not representable"),
    })
}

/// Fetches the statistics window and folds every failure into a
/// [`StatsOutcome::Error`]
#[derive(Clone)]
pub struct MarketDataFetcher {
    source: Arc<dyn MarketDataSource>,
}

impl MarketDataFetcher {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    /// Fetch one month of daily bars and summarize them
    #[instrument(skip_all, fields(symbol = %symbol, provider = self.source.name()))]
    pub async fn fetch_stats(&self, symbol: &TickerSymbol) -> StatsOutcome {
        match self.try_fetch_stats(symbol).await {
            Ok(stats) => {
                debug!(price = %stats.price, ma_20 = %stats.ma_20, trend = %stats.trend, "Computed stats");
                StatsOutcome::Stats(stats)
            },
            Err(e) => {
                warn!("Stats unavailable for {symbol}: {e}");
                StatsOutcome::error(e.user_message())
            },
        }
    }

    async fn try_fetch_stats(&self, symbol: &TickerSymbol) -> Result<StockStats> {
        let bars = self.source.history(symbol, HistoryWindow::STATS).await?;
        compute_stats(symbol, &bars)
    }
}
