//! Ticker symbols and chart timeframes

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper-cased, trimmed ticker symbol.
///
/// Only blank input is rejected here. Whether the symbol actually exists is
/// discovered when the market data fetch fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Normalize raw user input into a symbol
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(StockError::InvalidSymbol(input.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Symbol from a literal that is already upper-case and non-blank
    pub(crate) fn from_static(symbol: &'static str) -> Self {
        Self(symbol.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TickerSymbol {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TickerSymbol {
    type Error = StockError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TickerSymbol> for String {
    fn from(symbol: TickerSymbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for TickerSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Yahoo chart request window: how far back, and the bar size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub range: &'static str,
    pub interval: &'static str,
}

impl HistoryWindow {
    /// Window the headline statistics are computed over
    pub const STATS: Self = Self {
        range: "1mo",
        interval: "1d",
    };
}

impl fmt::Display for HistoryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.range, self.interval)
    }
}

/// Chart timeframe presets offered by the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    OneDay,
    OneWeek,
    #[default]
    OneMonth,
    SixMonths,
    OneYear,
    FiveYears,
}

impl Timeframe {
    /// All presets in display order
    pub const ALL: [Self; 6] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::SixMonths,
        Self::OneYear,
        Self::FiveYears,
    ];

    /// Short label used in the UI and query strings
    pub fn label(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
            Self::FiveYears => "5Y",
        }
    }

    /// Provider window for this preset
    pub fn window(self) -> HistoryWindow {
        let (range, interval) = match self {
            Self::OneDay => ("1d", "1m"),
            Self::OneWeek => ("5d", "30m"),
            Self::OneMonth => ("1mo", "1d"),
            Self::SixMonths => ("6mo", "1d"),
            Self::OneYear => ("1y", "1wk"),
            Self::FiveYears => ("5y", "1mo"),
        };
        HistoryWindow { range, interval }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|tf| tf.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| StockError::Config(format!("unknown timeframe '{wanted}'")))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = StockError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.label().to_string()
    }
}
