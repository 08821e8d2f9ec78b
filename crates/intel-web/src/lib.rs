//! Web dashboard for the stock intelligence services
//!
//! ## Endpoints
//!
//! - `GET /` - dashboard page (`?ticker=AAPL&timeframe=1M`)
//! - `POST /analyze` - run the analysis for the form's ticker, then redirect
//! - `GET /chart.svg` - price chart for a ticker and timeframe
//! - `GET /report.pdf` - PDF of the session's analysis
//! - `GET /api/stats/:ticker` - statistics as JSON
//! - `GET /api/sentiment/:ticker` - headline sentiment as JSON
//! - `GET /health` - liveness probe

pub mod error;
pub mod handlers;
pub mod state;
pub mod view;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, SESSION_COOKIE};

/// Create the dashboard router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard_page))
        .route("/analyze", post(handlers::analyze))
        .route("/chart.svg", get(handlers::chart_svg))
        .route("/report.pdf", get(handlers::report_pdf))
        .route("/api/stats/:ticker", get(handlers::stats_json))
        .route("/api/sentiment/:ticker", get(handlers::sentiment_json))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use chrono::{Duration, TimeZone, Utc};
    use intel_llm::{
        CompletionRequest, CompletionResponse, LLMProvider, Message, StopReason, TokenUsage,
    };
    use intel_stock::api::NewsItem;
    use intel_stock::symbol::HistoryWindow;
    use intel_stock::{Bar, Dashboard, DashboardConfig, MarketDataSource, NewsSource, StockError, TickerSymbol};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const NARRATIVE: &str = "Executive Summary: Apple trades above its 20-day average. \
        The Bottom Line: constructive. Key Drivers: services growth.";

    /// Known ticker AAPL; daily bars only for the stats window
    struct FakeMarket;

    #[async_trait]
    impl MarketDataSource for FakeMarket {
        async fn history(&self, symbol: &TickerSymbol, window: HistoryWindow) -> intel_stock::Result<Vec<Bar>> {
            if symbol.as_str() != "AAPL" {
                return Err(StockError::EmptyResult {
                    symbol: symbol.to_string(),
                    what: "quotes".to_string(),
                });
            }
            if window != HistoryWindow::STATS {
                return Ok(Vec::new());
            }
            let start = Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap();
            Ok((0..21_i32)
                .map(|i| {
                    let close = 170.0 + f64::from(i);
                    Bar::new(start + Duration::days(i64::from(i)), close - 0.5, close + 1.0, close - 1.0, close, 1_000_000)
                })
                .collect())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct FakeNews;

    #[async_trait]
    impl NewsSource for FakeNews {
        async fn headlines(&self, _symbol: &TickerSymbol, _limit: usize) -> intel_stock::Result<Vec<NewsItem>> {
            Ok(vec![NewsItem::headline("Shares surge after strong profit growth")])
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct FakeModel;

    #[async_trait]
    impl LLMProvider for FakeModel {
        async fn complete(&self, _request: CompletionRequest) -> intel_llm::Result<CompletionResponse> {
            Ok(CompletionResponse {
                message: Message::assistant(NARRATIVE),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn app_state() -> AppState {
        let dashboard = Dashboard::with_sources(
            DashboardConfig::default(),
            Arc::new(FakeMarket),
            Arc::new(FakeNews),
            Arc::new(FakeModel),
        )
        .unwrap();
        AppState::new(dashboard).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, form: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Run the analyze action and return the session cookie pair
    async fn analyze(state: &AppState, ticker: &str) -> String {
        let response = create_router(state.clone())
            .oneshot(post_form("/analyze", &format!("ticker={ticker}&timeframe=1M")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = create_router(app_state()).oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_page_without_analysis() {
        let response = create_router(app_state()).oneshot(get("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("AAPL Intelligence Dashboard"));
        assert!(html.contains("Generate Full Analysis"));
        assert!(html.contains("to load the dashboard."));
        assert!(!html.contains("Current Price"));
        assert!(html.contains(r#"<div id="busy" class="busy" role="status">Fetching data and generating AI insights...</div>"#));
        assert!(html.contains("this.querySelector('button').disabled = true"));
    }

    #[tokio::test]
    async fn test_analyze_redirects_and_sets_cookie() {
        let state = app_state();
        let response = create_router(state.clone())
            .oneshot(post_form("/analyze", "ticker=+aapl+&timeframe=1Y"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/?ticker=AAPL&timeframe=1Y");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE}=")));
        assert_eq!(state.session_count(), 1);
    }

    #[tokio::test]
    async fn test_loaded_view_follows_entered_ticker() {
        let state = app_state();
        let cookie = analyze(&state, "AAPL").await;

        let response = create_router(state.clone())
            .oneshot(get("/?ticker=aapl&timeframe=1M", Some(&cookie)))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Current Price"));
        assert!(html.contains("$190.00"));
        assert!(html.contains("Outlook: BULLISH"));
        assert!(html.contains("Apple trades above its 20-day average."));

        // Another ticker shows the empty state without touching the session
        let response = create_router(state.clone())
            .oneshot(get("/?ticker=MSFT", Some(&cookie)))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(!html.contains("Current Price"));
        assert_eq!(state.session_count(), 1);
    }

    #[tokio::test]
    async fn test_timeframe_change_keeps_snapshot() {
        let state = app_state();
        let cookie = analyze(&state, "AAPL").await;
        let sid = cookie.split_once('=').unwrap().1.to_string();
        let before = state.session(Some(&sid)).snapshot().cloned().unwrap();

        let response = create_router(state.clone())
            .oneshot(get("/?ticker=AAPL&timeframe=1Y", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("chart.svg?ticker=AAPL&amp;timeframe=1Y"));

        let after = state.session(Some(&sid)).snapshot().cloned().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let response = create_router(app_state())
            .oneshot(get("/?timeframe=2D", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = create_router(app_state())
            .oneshot(post_form("/analyze", "ticker=+++"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats_api() {
        let state = app_state();

        let response = create_router(state.clone())
            .oneshot(get("/api/stats/aapl", None))
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["trend"], "Bullish");
        assert!(json.get("price").is_some());
        assert!(json.get("ma_20").is_some());

        let response = create_router(state)
            .oneshot(get("/api/stats/INVALID_TICKER_123", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["error"], "Invalid Ticker");
        assert!(json.get("price").is_none());
    }

    #[tokio::test]
    async fn test_sentiment_api() {
        let response = create_router(app_state())
            .oneshot(get("/api/sentiment/AAPL", None))
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["sentiment"], "Positive");
    }

    #[tokio::test]
    async fn test_report_requires_analysis() {
        let response = create_router(app_state())
            .oneshot(get("/report.pdf?ticker=AAPL", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_report_download() {
        let state = app_state();
        let cookie = analyze(&state, "AAPL").await;

        // No bars for the yearly window, so the report carries the chart note
        let response = create_router(state)
            .oneshot(get("/report.pdf?ticker=AAPL&timeframe=1Y", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"AAPL_Report.pdf\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    #[ignore = "requires system fonts"]
    async fn test_chart_placeholder() {
        let response = create_router(app_state())
            .oneshot(get("/chart.svg?ticker=AAPL&timeframe=5Y", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        assert!(body_text(response).await.contains("<svg"));
    }
}
