//! Headline sentiment scoring
//!
//! Headlines come from a [`NewsSource`]; each title gets a lexicon polarity
//! and the average decides the label. Scoring never fails: every problem
//! degrades to an annotated `Neutral` reading.

pub mod lexicon;

pub use lexicon::PolarityScorer;

use crate::api::news::NewsItem;
use crate::error::Result;
use crate::symbol::TickerSymbol;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Number of items considered per symbol
pub const DEFAULT_NEWS_LIMIT: usize = 5;

/// Source of recent news items for a symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Up to `limit` recent items, newest first
    async fn headlines(&self, symbol: &TickerSymbol, limit: usize) -> Result<Vec<NewsItem>>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Overall headline tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Strictly above `0.1` is positive, strictly below `-0.1` negative
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.1 {
            Self::Positive
        } else if polarity < -0.1 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a reading fell back to `Neutral`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SentimentNote {
    NoRecentNews,
    UnparseableHeadlines,
    Error(String),
}

impl fmt::Display for SentimentNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRecentNews => f.write_str("No recent news found"),
            Self::UnparseableHeadlines => f.write_str("Could not parse headlines"),
            Self::Error(msg) => write!(f, "Sentiment Error: {msg}"),
        }
    }
}

/// Result of scoring one symbol's headlines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub label: SentimentLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<SentimentNote>,
    /// Average polarity, present when headlines were scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<f64>,
    /// Headlines that contributed to the score
    #[serde(default)]
    pub headlines: Vec<String>,
}

impl SentimentReading {
    /// Reading computed from scored headlines
    pub fn scored(polarity: f64, headlines: Vec<String>) -> Self {
        Self {
            label: SentimentLabel::from_polarity(polarity),
            note: None,
            polarity: Some(polarity),
            headlines,
        }
    }

    /// Neutral reading annotated with the reason
    pub fn neutral(note: SentimentNote) -> Self {
        Self {
            label: SentimentLabel::Neutral,
            note: Some(note),
            polarity: None,
            headlines: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.note.is_some()
    }

    /// The string shown to users and embedded in prompts
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SentimentReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.note {
            Some(note) => write!(f, "{} ({note})", self.label),
            None => write!(f, "{}", self.label),
        }
    }
}

/// Turns a symbol's recent headlines into a [`SentimentReading`]
#[derive(Clone)]
pub struct SentimentScorer {
    source: Arc<dyn NewsSource>,
    scorer: PolarityScorer,
    limit: usize,
}

impl SentimentScorer {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        Self {
            source,
            scorer: PolarityScorer::new(),
            limit: DEFAULT_NEWS_LIMIT,
        }
    }

    /// Consider at most `limit` items (at least one)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Score the symbol's headlines; never fails
    #[instrument(skip_all, fields(symbol = %symbol, source = self.source.name()))]
    pub async fn score(&self, symbol: &TickerSymbol) -> SentimentReading {
        match self.try_score(symbol).await {
            Ok(reading) => {
                debug!(reading = %reading, "Scored headlines");
                reading
            },
            Err(e) => {
                warn!("Sentiment unavailable for {symbol}: {e}");
                SentimentReading::neutral(SentimentNote::Error(e.to_string()))
            },
        }
    }

    async fn try_score(&self, symbol: &TickerSymbol) -> Result<SentimentReading> {
        let items = self.source.headlines(symbol, self.limit).await?;
        if items.is_empty() {
            return Ok(SentimentReading::neutral(SentimentNote::NoRecentNews));
        }

        let titles: Vec<String> = items
            .iter()
            .take(self.limit)
            .filter_map(NewsItem::title)
            .map(str::to_string)
            .collect();
        if titles.is_empty() {
            return Ok(SentimentReading::neutral(SentimentNote::UnparseableHeadlines));
        }

        let total: f64 = titles.iter().map(|t| self.scorer.polarity(t)).sum();
        let average = total / titles.len() as f64;
        Ok(SentimentReading::scored(average, titles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockError;

    fn aapl() -> TickerSymbol {
        TickerSymbol::parse("AAPL").unwrap()
    }

    fn scorer_with(items: Vec<NewsItem>) -> SentimentScorer {
        let mut source = MockNewsSource::new();
        source
            .expect_headlines()
            .withf(|_, limit| *limit == DEFAULT_NEWS_LIMIT)
            .returning(move |_, _| Ok(items.clone()));
        source.expect_name().return_const("mock".to_string());
        SentimentScorer::new(Arc::new(source))
    }

    #[test]
    fn test_label_thresholds() {
        assert_eq!(SentimentLabel::from_polarity(0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(-0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(0.100_000_1), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_polarity(-0.100_000_1), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_polarity(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn test_reading_display() {
        assert_eq!(
            SentimentReading::neutral(SentimentNote::NoRecentNews).to_string(),
            "Neutral (No recent news found)"
        );
        assert_eq!(
            SentimentReading::neutral(SentimentNote::UnparseableHeadlines).to_string(),
            "Neutral (Could not parse headlines)"
        );
        assert_eq!(
            SentimentReading::neutral(SentimentNote::Error("timeout".to_string())).to_string(),
            "Neutral (Sentiment Error: timeout)"
        );
        assert_eq!(SentimentReading::scored(0.4, Vec::new()).to_string(), "Positive");
    }

    #[tokio::test]
    async fn test_no_news() {
        let reading = scorer_with(Vec::new()).score(&aapl()).await;
        assert_eq!(reading.display(), "Neutral (No recent news found)");
    }

    #[tokio::test]
    async fn test_items_without_titles() {
        let items = vec![NewsItem::default(), NewsItem::headline("  ")];
        let reading = scorer_with(items).score(&aapl()).await;
        assert_eq!(reading.display(), "Neutral (Could not parse headlines)");
    }

    #[tokio::test]
    async fn test_positive_headlines() {
        let items = vec![
            NewsItem::headline("Apple posts record profit as sales surge"),
            NewsItem::default(),
            NewsItem::headline("Analysts upgrade Apple on strong demand"),
        ];
        let reading = scorer_with(items).score(&aapl()).await;

        assert_eq!(reading.label, SentimentLabel::Positive);
        assert_eq!(reading.headlines.len(), 2);
        assert!(!reading.is_degraded());
    }

    #[tokio::test]
    async fn test_only_first_items_scored() {
        let mut items: Vec<NewsItem> = (0..5)
            .map(|i| NewsItem::headline(format!("Quarterly meeting {i}")))
            .collect();
        items.push(NewsItem::headline("Shares crash after terrible fraud probe"));

        let reading = scorer_with(items).score(&aapl()).await;
        assert_eq!(reading.label, SentimentLabel::Neutral);
        assert_eq!(reading.headlines.len(), 5);
    }

    #[tokio::test]
    async fn test_source_error_degrades() {
        let mut source = MockNewsSource::new();
        source.expect_headlines().returning(|_, _| {
            Err(StockError::Network("connection reset".to_string()))
        });
        source.expect_name().return_const("mock".to_string());

        let reading = SentimentScorer::new(Arc::new(source)).score(&aapl()).await;
        assert_eq!(reading.label, SentimentLabel::Neutral);
        assert_eq!(
            reading.display(),
            "Neutral (Sentiment Error: Network error: connection reset)"
        );
    }
}
