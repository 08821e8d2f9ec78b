//! Stock intelligence domain
//!
//! This crate turns a ticker symbol into an executive-ready briefing. It
//! includes:
//!
//! - Market data from Yahoo Finance: latest close, 20-day mean and trend
//! - Headline sentiment from recent Yahoo news titles
//! - An AI narrative from an OpenAI-compatible chat model (Groq by default)
//! - Candlestick charts with a 20-period SMA overlay and volume panel
//! - A one-page PDF report
//! - MACD and Bollinger Band readings
//!
//! # Architecture
//!
//! Every step catches its own failures and returns a displayable value, so a
//! single analysis always produces an [`AnalysisSnapshot`]:
//! - [`MarketDataFetcher`]: stats or `{"error": ...}`
//! - [`SentimentScorer`]: a label, annotated `Neutral` on failure
//! - [`NarrativeGenerator`]: model text or a diagnostic message
//!
//! [`AnalysisPipeline`] runs the three in order; [`Dashboard`] wires them
//! together with the chart and report services from a [`DashboardConfig`].
//!
//! # Example
//!
//! ```rust,ignore
//! use intel_stock::{Dashboard, DashboardConfig, TickerSymbol};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dashboard = Dashboard::from_config(DashboardConfig::from_env()?)?;
//!
//!     let snapshot = dashboard.analyze(&TickerSymbol::parse("aapl")?).await;
//!     println!("{}", snapshot.stats.to_json());
//!     println!("{}", snapshot.narrative.text);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod indicators;
pub mod market;
pub mod narrative;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod sentiment;
pub mod session;
pub mod symbol;

// Re-export main types for convenience
pub use chart::{ChartService, ChartSize, ChartView, PriceSeries};
pub use config::{DashboardConfig, SentimentSource};
pub use error::{Result, StockError};
pub use indicators::{IndicatorReading, IndicatorSnapshot, compute_indicators};
pub use market::{Bar, MarketDataFetcher, MarketDataSource, StatsOutcome, StockStats, Trend};
pub use narrative::{NarrativeFailure, NarrativeGenerator, NarrativeReport, NarrativeSettings};
pub use pipeline::{AnalysisPipeline, Dashboard};
pub use report::{REPORT_MIME, ReportExporter, ReportInput, report_filename};
pub use sentiment::{NewsSource, SentimentLabel, SentimentNote, SentimentReading, SentimentScorer};
pub use session::{AnalysisSnapshot, DashboardView, SessionState};
pub use symbol::{TickerSymbol, Timeframe};
