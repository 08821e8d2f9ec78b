//! Route handlers

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, DASHBOARD_TEMPLATE, SESSION_COOKIE};
use crate::view::DashboardPage;
use axum::Json;
use axum::extract::{Form, Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use intel_stock::chart::{ChartSize, render_message_svg, render_svg};
use intel_stock::{
    ChartView, DashboardView, REPORT_MIME, SentimentReading, StatsOutcome, TickerSymbol,
    Timeframe, report_filename,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

const SVG_MIME: &str = "image/svg+xml";

/// Ticker and timeframe as they arrive in query strings and forms
#[derive(Debug, Default, Deserialize)]
pub struct TickerParams {
    pub ticker: Option<String>,
    pub timeframe: Option<String>,
}

impl TickerParams {
    /// Blank or missing ticker falls back to `default`
    fn ticker_or(&self, default: &TickerSymbol) -> ApiResult<TickerSymbol> {
        match self.ticker.as_deref().map(str::trim) {
            None | Some("") => Ok(default.clone()),
            Some(raw) => Ok(TickerSymbol::parse(raw)?),
        }
    }

    /// The ticker must be present
    fn required_ticker(&self) -> ApiResult<TickerSymbol> {
        let raw = self.ticker.as_deref().unwrap_or_default();
        TickerSymbol::parse(raw).map_err(|_| ApiError::bad_request("ticker must not be blank"))
    }

    fn timeframe(&self) -> ApiResult<Timeframe> {
        match self.timeframe.as_deref().map(str::trim) {
            None | Some("") => Ok(Timeframe::default()),
            Some(raw) => Ok(raw.parse::<Timeframe>()?),
        }
    }
}

fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string())
}

fn dashboard_url(ticker: &TickerSymbol, timeframe: Timeframe) -> String {
    format!("/?ticker={ticker}&timeframe={}", timeframe.label())
}

/// `GET /` renders the page for the entered ticker
pub async fn dashboard_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<TickerParams>,
) -> ApiResult<Html<String>> {
    let ticker = params.ticker_or(&state.dashboard().config().default_ticker)?;
    let timeframe = params.timeframe()?;

    let session = state.session(session_id(&jar).as_deref());
    let view = DashboardView::resolve(&session, &ticker);
    let page = DashboardPage::build(view, &ticker, timeframe, &state.dashboard().config().model);

    let html = state
        .templates()
        .get_template(DASHBOARD_TEMPLATE)
        .and_then(|template| template.render(&page))
        .map_err(|e| ApiError::internal(format!("dashboard template: {e}")))?;
    Ok(Html(html))
}

/// `POST /analyze` runs the pipeline and replaces the session snapshot
#[instrument(skip_all)]
pub async fn analyze(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(params): Form<TickerParams>,
) -> ApiResult<(CookieJar, Redirect)> {
    let ticker = params.required_ticker()?;
    let timeframe = params.timeframe()?;

    let snapshot = state.dashboard().analyze(&ticker).await;
    info!(ticker = %ticker, id = %snapshot.id, "Stored analysis");
    let sid = state.store_snapshot(session_id(&jar).as_deref(), snapshot);

    let cookie = Cookie::build((SESSION_COOKIE, sid))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok((jar.add(cookie), Redirect::to(&dashboard_url(&ticker, timeframe))))
}

/// `GET /chart.svg` draws the timeframe's chart; reads no session state
pub async fn chart_svg(
    State(state): State<AppState>,
    Query(params): Query<TickerParams>,
) -> ApiResult<Response> {
    let ticker = params.required_ticker()?;
    let timeframe = params.timeframe()?;

    let view = state.dashboard().chart(&ticker, timeframe).await;
    let svg = tokio::task::spawn_blocking(move || match &view {
        ChartView::Ready(series) => render_svg(series, ChartSize::WEB),
        ChartView::Empty { message } | ChartView::Unavailable { message } => {
            render_message_svg(message, ChartSize::WEB)
        },
    })
    .await
    .map_err(|e| ApiError::internal(format!("chart task failed: {e}")))??;

    Ok(([(header::CONTENT_TYPE, SVG_MIME)], svg).into_response())
}

/// `GET /report.pdf` exports the session's analysis of the ticker
pub async fn report_pdf(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<TickerParams>,
) -> ApiResult<Response> {
    let ticker = params.required_ticker()?;
    let timeframe = params.timeframe()?;

    let session = state.session(session_id(&jar).as_deref());
    let snapshot = DashboardView::resolve(&session, &ticker)
        .snapshot()
        .ok_or_else(|| ApiError::analysis_not_found(ticker.as_str()))?;

    let pdf = state.dashboard().report(snapshot, timeframe).await?;
    let disposition = format!("attachment; filename=\"{}\"", report_filename(&ticker));
    Ok((
        [
            (header::CONTENT_TYPE, REPORT_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

/// `GET /api/stats/:ticker`
pub async fn stats_json(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> ApiResult<Json<StatsOutcome>> {
    let ticker = TickerSymbol::parse(&ticker)?;
    Ok(Json(state.dashboard().stats(&ticker).await))
}

/// `GET /api/sentiment/:ticker`
pub async fn sentiment_json(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> ApiResult<Json<Value>> {
    let ticker = TickerSymbol::parse(&ticker)?;
    let reading: SentimentReading = state.dashboard().sentiment(&ticker).await;
    Ok(Json(json!({
        "symbol": ticker,
        "sentiment": reading.display(),
        "reading": reading,
    })))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.session_count(),
    }))
}
