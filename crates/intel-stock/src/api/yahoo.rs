//! Yahoo Finance chart API client

use crate::error::{Result, StockError};
use crate::market::{Bar, MarketDataSource};
use crate::symbol::{HistoryWindow, TickerSymbol};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

const PROVIDER: &str = "Yahoo Finance";

/// Price history from the Yahoo Finance chart endpoint (no API key)
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooMarketData;

impl YahooMarketData {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MarketDataSource for YahooMarketData {
    #[instrument(skip_all, fields(symbol = %symbol, window = %window))]
    async fn history(&self, symbol: &TickerSymbol, window: HistoryWindow) -> Result<Vec<Bar>> {
        let provider = yahoo::YahooConnector::new().map_err(|e| classify_error(&e))?;

        let response = provider
            .get_quote_range(symbol.as_str(), window.interval, window.range)
            .await
            .map_err(|e| classify_error(&e))?;

        let quotes = response.quotes().map_err(|e| classify_error(&e))?;
        debug!("Received {} bars", quotes.len());

        Ok(quotes
            .iter()
            .map(|q| Bar {
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

/// Sort a connector error by its message into transport, decoding or
/// provider rejection
fn classify_error(err: &yahoo::YahooError) -> StockError {
    let message = err.to_string();
    let lower = message.to_lowercase();

    if lower.contains("connection") || lower.contains("timed out") {
        StockError::Network(message)
    } else if lower.contains("deserializ") || lower.contains("json") {
        StockError::Parse {
            what: "chart response".to_string(),
            reason: message,
        }
    } else {
        StockError::Provider {
            provider: PROVIDER.to_string(),
            message,
        }
    }
}
