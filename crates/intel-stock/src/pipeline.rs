//! Analyze action and the service bundle behind the front ends

use crate::api::{SyntheticNews, YahooMarketData, YahooNews};
use crate::chart::{ChartService, ChartView, PriceSeries};
use crate::config::{DashboardConfig, SentimentSource};
use crate::error::{Result, StockError};
use crate::indicators::{IndicatorReading, compute_indicators};
use crate::market::{MarketDataFetcher, MarketDataSource, StatsOutcome};
use crate::narrative::NarrativeGenerator;
use crate::report::{ReportExporter, ReportInput};
use crate::sentiment::{NewsSource, SentimentReading, SentimentScorer};
use crate::session::AnalysisSnapshot;
use crate::symbol::{TickerSymbol, Timeframe};
use intel_llm::LLMProvider;
use intel_llm::providers::OpenAIProvider;
use std::sync::Arc;
use tracing::{info, instrument};

/// Stats, then sentiment, then narrative; each step sees the previous results
#[derive(Clone)]
pub struct AnalysisPipeline {
    fetcher: MarketDataFetcher,
    sentiment: SentimentScorer,
    narrative: NarrativeGenerator,
}

impl AnalysisPipeline {
    pub fn new(
        fetcher: MarketDataFetcher,
        sentiment: SentimentScorer,
        narrative: NarrativeGenerator,
    ) -> Self {
        Self {
            fetcher,
            sentiment,
            narrative,
        }
    }

    /// Run one analysis. Never fails: every step degrades to a value.
    #[instrument(skip_all, fields(symbol = %symbol))]
    pub async fn run(&self, symbol: &TickerSymbol) -> AnalysisSnapshot {
        let stats = self.fetcher.fetch_stats(symbol).await;
        let sentiment = self.sentiment.score(symbol).await;
        let narrative = self.narrative.generate(symbol, &stats, &sentiment).await;

        let snapshot = AnalysisSnapshot::new(symbol.clone(), stats, sentiment, narrative);
        info!(
            id = %snapshot.id,
            stats_error = snapshot.stats.is_error(),
            narrative_degraded = snapshot.narrative.is_degraded(),
            "Analysis complete"
        );
        snapshot
    }

    pub fn fetcher(&self) -> &MarketDataFetcher {
        &self.fetcher
    }

    pub fn sentiment(&self) -> &SentimentScorer {
        &self.sentiment
    }

    pub fn narrative(&self) -> &NarrativeGenerator {
        &self.narrative
    }
}

/// Every service the web UI and CLI need, wired from one configuration
#[derive(Clone)]
pub struct Dashboard {
    config: Arc<DashboardConfig>,
    pipeline: AnalysisPipeline,
    charts: ChartService,
    reports: ReportExporter,
}

impl Dashboard {
    /// Wire the live providers: Yahoo for prices and news, the configured
    /// OpenAI-compatible endpoint for narratives
    pub fn from_config(config: DashboardConfig) -> Result<Self> {
        let market: Arc<dyn MarketDataSource> = Arc::new(YahooMarketData::new());
        let news: Arc<dyn NewsSource> = match config.sentiment_source {
            SentimentSource::Live => Arc::new(YahooNews::new(
                &config.news_api_base,
                config.request_timeout,
            )?),
            SentimentSource::Synthetic => Arc::new(SyntheticNews),
        };
        let llm: Arc<dyn LLMProvider> = Arc::new(
            OpenAIProvider::with_config(config.llm_config())
                .map_err(|e| StockError::Config(format!("LLM client: {e}")))?,
        );

        info!(
            model = %config.model,
            llm_api_base = %config.llm_api_base,
            sentiment_source = %config.sentiment_source,
            "Dashboard services configured"
        );
        Self::with_sources(config, market, news, llm)
    }

    /// Wire the given sources
    pub fn with_sources(
        config: DashboardConfig,
        market: Arc<dyn MarketDataSource>,
        news: Arc<dyn NewsSource>,
        llm: Arc<dyn LLMProvider>,
    ) -> Result<Self> {
        let narrative = NarrativeGenerator::new(llm, config.narrative_settings())
            .map_err(|e| StockError::Config(format!("prompt templates: {e}")))?;
        let sentiment = SentimentScorer::new(news).with_limit(config.news_limit);
        let pipeline =
            AnalysisPipeline::new(MarketDataFetcher::new(market.clone()), sentiment, narrative);

        Ok(Self {
            config: Arc::new(config),
            pipeline,
            charts: ChartService::new(market),
            reports: ReportExporter::new(),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &AnalysisPipeline {
        &self.pipeline
    }

    pub fn charts(&self) -> &ChartService {
        &self.charts
    }

    pub async fn analyze(&self, symbol: &TickerSymbol) -> AnalysisSnapshot {
        self.pipeline.run(symbol).await
    }

    pub async fn stats(&self, symbol: &TickerSymbol) -> StatsOutcome {
        self.pipeline.fetcher().fetch_stats(symbol).await
    }

    pub async fn sentiment(&self, symbol: &TickerSymbol) -> SentimentReading {
        self.pipeline.sentiment().score(symbol).await
    }

    pub async fn chart(&self, symbol: &TickerSymbol, timeframe: Timeframe) -> ChartView {
        self.charts.view(symbol, timeframe).await
    }

    /// MACD and Bollinger readings over the timeframe's bars
    pub async fn indicators(
        &self,
        symbol: &TickerSymbol,
        timeframe: Timeframe,
    ) -> Result<IndicatorReading> {
        let series = self.charts.series(symbol, timeframe).await?;
        compute_indicators(&series.bars)
    }

    /// PDF for `snapshot`, with the chart of `timeframe` when it can be fetched
    #[instrument(skip_all, fields(ticker = %snapshot.ticker, timeframe = %timeframe))]
    pub async fn report(&self, snapshot: &AnalysisSnapshot, timeframe: Timeframe) -> Result<Vec<u8>> {
        let view = self.charts.view(&snapshot.ticker, timeframe).await;
        let series: Option<PriceSeries> = match view {
            ChartView::Ready(series) => Some(series),
            ChartView::Empty { .. } | ChartView::Unavailable { .. } => None,
        };

        let reports = self.reports;
        let snapshot = snapshot.clone();
        tokio::task::spawn_blocking(move || {
            reports.export(&ReportInput {
                snapshot: &snapshot,
                series: series.as_ref(),
            })
        })
        .await
        .map_err(|e| StockError::Export(format!("report task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NewsItem;
    use crate::market::MockMarketDataSource;
    use crate::market::fixtures::bars_from_closes;
    use crate::narrative::NarrativeOrigin;
    use crate::sentiment::{MockNewsSource, SentimentLabel, SentimentNote};
    use crate::session::{DashboardView, SessionState};
    use async_trait::async_trait;
    use intel_llm::{CompletionRequest, CompletionResponse, Message, StopReason, TokenUsage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SUMMARY: &str = "Executive Summary: steady quarter. The Bottom Line: hold. Key Drivers: services.";

    struct FixedProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LLMProvider for FixedProvider {
        async fn complete(&self, _request: CompletionRequest) -> intel_llm::Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CompletionResponse {
                message: Message::assistant(SUMMARY),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn provider() -> Arc<FixedProvider> {
        Arc::new(FixedProvider {
            calls: AtomicUsize::new(0),
        })
    }

    fn dashboard(
        market: MockMarketDataSource,
        news: MockNewsSource,
        llm: Arc<FixedProvider>,
    ) -> Dashboard {
        Dashboard::with_sources(
            DashboardConfig::default(),
            Arc::new(market),
            Arc::new(news),
            llm,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_success() {
        let mut market = MockMarketDataSource::new();
        market
            .expect_history()
            .returning(|_, _| Ok(bars_from_closes(&[100.0, 110.0, 120.0])));
        market.expect_name().return_const("mock".to_string());
        let mut news = MockNewsSource::new();
        news.expect_headlines()
            .returning(|_, _| Ok(vec![NewsItem::headline("Shares surge on strong profit growth")]));
        news.expect_name().return_const("mock".to_string());

        let llm = provider();
        let dashboard = dashboard(market, news, llm.clone());
        let symbol = TickerSymbol::parse("aapl").unwrap();
        let snapshot = dashboard.analyze(&symbol).await;

        assert_eq!(snapshot.ticker.as_str(), "AAPL");
        let stats = snapshot.stats.stats().unwrap();
        assert_eq!(stats.price.to_string(), "120");
        assert_eq!(snapshot.sentiment.label, SentimentLabel::Positive);
        assert_eq!(snapshot.narrative.origin, NarrativeOrigin::Model);
        assert_eq!(snapshot.narrative.text, SUMMARY);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_invalid_ticker_skips_model() {
        let mut market = MockMarketDataSource::new();
        market.expect_history().returning(|symbol, _| {
            Err(StockError::EmptyResult {
                symbol: symbol.to_string(),
                what: "quotes".to_string(),
            })
        });
        market.expect_name().return_const("mock".to_string());
        let mut news = MockNewsSource::new();
        news.expect_headlines().returning(|_, _| Ok(Vec::new()));
        news.expect_name().return_const("mock".to_string());

        let llm = provider();
        let dashboard = dashboard(market, news, llm.clone());
        let symbol = TickerSymbol::parse("INVALID_TICKER_123").unwrap();
        let snapshot = dashboard.analyze(&symbol).await;

        assert_eq!(snapshot.stats.error_message(), Some("Invalid Ticker"));
        assert_eq!(
            snapshot.sentiment.note,
            Some(SentimentNote::NoRecentNews)
        );
        assert!(snapshot.narrative.is_degraded());
        assert!(snapshot.narrative.text.len() > 50);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_timeframe_change_keeps_session_snapshot() {
        let mut market = MockMarketDataSource::new();
        market
            .expect_history()
            .returning(|_, window| {
                let len = if window == Timeframe::OneYear.window() { 52 } else { 21 };
                Ok(bars_from_closes(&vec![100.0; len]))
            });
        market.expect_name().return_const("mock".to_string());
        let mut news = MockNewsSource::new();
        news.expect_headlines().returning(|_, _| Ok(Vec::new()));
        news.expect_name().return_const("mock".to_string());

        let llm = provider();
        let dashboard = dashboard(market, news, llm.clone());
        let symbol = TickerSymbol::parse("AAPL").unwrap();
        let mut session = SessionState::new();
        session.store(dashboard.analyze(&symbol).await);
        let stored_id = session.snapshot().unwrap().id;

        let month = dashboard.chart(&symbol, Timeframe::OneMonth).await;
        let year = dashboard.chart(&symbol, Timeframe::OneYear).await;
        assert_eq!(month.series().unwrap().len(), 21);
        assert_eq!(year.series().unwrap().len(), 52);

        // The session still resolves to the same analysis and nothing re-ran
        let view = DashboardView::resolve(&session, &symbol);
        assert_eq!(view.snapshot().unwrap().id, stored_id);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_report_without_chart_data() {
        let mut market = MockMarketDataSource::new();
        market.expect_history().returning(|_, _| Ok(Vec::new()));
        market.expect_name().return_const("mock".to_string());
        let mut news = MockNewsSource::new();
        news.expect_headlines().returning(|_, _| Ok(Vec::new()));
        news.expect_name().return_const("mock".to_string());

        let dashboard = dashboard(market, news, provider());
        let symbol = TickerSymbol::parse("AAPL").unwrap();
        let snapshot = dashboard.analyze(&symbol).await;

        let pdf = dashboard.report(&snapshot, Timeframe::OneMonth).await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_from_config_synthetic() {
        let config = DashboardConfig::builder()
            .sentiment_source(SentimentSource::Synthetic)
            .build()
            .unwrap();
        let dashboard = Dashboard::from_config(config).unwrap();
        assert_eq!(dashboard.config().sentiment_source, SentimentSource::Synthetic);
    }
}
