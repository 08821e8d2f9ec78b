//! Headline sources for sentiment scoring

use crate::error::{Result, StockError};
use crate::sentiment::NewsSource;
use crate::symbol::TickerSymbol;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default Yahoo Finance query host
pub const YAHOO_NEWS_API_BASE: &str = "https://query2.finance.yahoo.com";

const PROVIDER: &str = "Yahoo Finance news";

// Yahoo rejects requests without a browser-like agent
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// One news item as delivered by the provider.
///
/// Newer payloads nest the article fields under `content`; older ones keep
/// them at the top level. Either may lack a title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<NewsContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Nested article body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl NewsItem {
    /// Item with a top-level title only
    pub fn headline(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// The headline text, if any.
    ///
    /// Reads `content.title` when the item has a `content` wrapper and the
    /// top-level `title` otherwise. Blank titles count as missing.
    pub fn title(&self) -> Option<&str> {
        let raw = match &self.content {
            Some(content) => content.title.as_deref(),
            None => self.title.as_deref(),
        };
        raw.map(str::trim).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<serde_json::Value>,
}

/// Live headlines from the Yahoo Finance search endpoint
#[derive(Debug, Clone)]
pub struct YahooNews {
    client: Client,
    api_base: String,
}

impl YahooNews {
    /// Create a client against `api_base` (normally [`YAHOO_NEWS_API_BASE`])
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NewsSource for YahooNews {
    #[instrument(skip_all, fields(symbol = %symbol, limit = limit))]
    async fn headlines(&self, symbol: &TickerSymbol, limit: usize) -> Result<Vec<NewsItem>> {
        let url = format!("{}/v1/finance/search", self.api_base);
        let news_count = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", symbol.as_str()),
                ("quotesCount", "0"),
                ("newsCount", news_count.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(StockError::Auth {
                provider: PROVIDER.to_string(),
            });
        }
        if !status.is_success() {
            return Err(StockError::Provider {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| StockError::Parse {
            what: "news search response".to_string(),
            reason: e.to_string(),
        })?;

        // An item that is not an object still counts as an item without a title
        let items: Vec<NewsItem> = parsed
            .news
            .into_iter()
            .take(limit)
            .map(|value| serde_json::from_value(value).unwrap_or_default())
            .collect();

        debug!("Received {} news items", items.len());
        Ok(items)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

/// Fixed headlines for offline demos
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticNews;

impl SyntheticNews {
    const TEMPLATES: [&'static str; 3] = [
        "{} shares climb after strong quarterly earnings beat expectations",
        "Analysts remain cautious on {} amid broader market volatility",
        "{} unveils new product line as investors turn optimistic",
    ];
}

#[async_trait]
impl NewsSource for SyntheticNews {
    async fn headlines(&self, symbol: &TickerSymbol, limit: usize) -> Result<Vec<NewsItem>> {
        Ok(Self::TEMPLATES
            .iter()
            .take(limit)
            .map(|template| NewsItem::headline(template.replace("{}", symbol.as_str())))
            .collect())
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
