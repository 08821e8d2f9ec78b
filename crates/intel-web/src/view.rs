//! Template context for the dashboard page

use intel_stock::{
    AnalysisSnapshot, DashboardView, StatsOutcome, TickerSymbol, Timeframe, Trend,
};
use pulldown_cmark::{Event, Options, Parser, html};
use serde::Serialize;

/// Shown under the generate button while an analysis request runs
pub const BUSY_MESSAGE: &str = "Fetching data and generating AI insights...";

/// Message shown until the entered ticker has been analyzed
pub const EMPTY_STATE_MESSAGE: &str =
    "Enter a ticker and click 'Generate Full Analysis' to load the dashboard.";

#[derive(Debug, Serialize)]
pub struct TimeframeOption {
    pub label: &'static str,
    pub selected: bool,
}

/// Values of one loaded analysis, already formatted for display
#[derive(Debug, Serialize)]
pub struct LoadedPanel {
    pub price: String,
    pub ma_20: String,
    /// Signed price minus MA, e.g. "+5.77"
    pub ma_delta: String,
    pub ma_delta_up: bool,
    pub trend: String,
    /// CSS class of the outlook banner
    pub trend_class: &'static str,
    pub sentiment: String,
    pub stats_error: Option<String>,
    /// Narrative markdown rendered to HTML; raw HTML in the source is escaped
    pub narrative_html: String,
    pub narrative_degraded: bool,
    pub generated_at: String,
    pub chart_url: String,
    pub report_url: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub ticker: String,
    pub timeframe: &'static str,
    pub timeframes: Vec<TimeframeOption>,
    pub model: String,
    pub busy_message: &'static str,
    pub empty_message: &'static str,
    pub loaded: Option<LoadedPanel>,
}

impl DashboardPage {
    pub fn build(
        view: DashboardView<'_>,
        ticker: &TickerSymbol,
        timeframe: Timeframe,
        model: &str,
    ) -> Self {
        Self {
            ticker: ticker.to_string(),
            timeframe: timeframe.label(),
            timeframes: Timeframe::ALL
                .iter()
                .map(|tf| TimeframeOption {
                    label: tf.label(),
                    selected: *tf == timeframe,
                })
                .collect(),
            model: model.to_string(),
            busy_message: BUSY_MESSAGE,
            empty_message: EMPTY_STATE_MESSAGE,
            loaded: view
                .snapshot()
                .map(|snapshot| LoadedPanel::from_snapshot(snapshot, timeframe)),
        }
    }
}

impl LoadedPanel {
    fn from_snapshot(snapshot: &AnalysisSnapshot, timeframe: Timeframe) -> Self {
        let query = format!("ticker={}&timeframe={}", snapshot.ticker, timeframe.label());
        let sentiment = snapshot.sentiment.display();
        let narrative_html = render_markdown(&snapshot.narrative.text);
        let narrative_degraded = snapshot.narrative.is_degraded();
        let generated_at = snapshot.generated_at.format("%Y-%m-%d %H:%M UTC").to_string();
        let chart_url = format!("/chart.svg?{query}");
        let report_url = format!("/report.pdf?{query}");

        match &snapshot.stats {
            StatsOutcome::Stats(stats) => {
                let delta = stats.ma_gap();
                let ma_delta_up = !delta.is_sign_negative();
                Self {
                    price: format!("${:.2}", stats.price),
                    ma_20: format!("${:.2}", stats.ma_20),
                    ma_delta: if ma_delta_up {
                        format!("+{delta:.2}")
                    } else {
                        format!("{delta:.2}")
                    },
                    ma_delta_up,
                    trend: stats.trend.to_string(),
                    trend_class: match stats.trend {
                        Trend::Bullish => "bullish",
                        Trend::Bearish => "bearish",
                    },
                    sentiment,
                    stats_error: None,
                    narrative_html,
                    narrative_degraded,
                    generated_at,
                    chart_url,
                    report_url,
                }
            },
            StatsOutcome::Error { error } => Self {
                price: "N/A".to_string(),
                ma_20: "N/A".to_string(),
                ma_delta: String::new(),
                ma_delta_up: false,
                trend: "N/A".to_string(),
                trend_class: "unknown",
                sentiment,
                stats_error: Some(error.clone()),
                narrative_html,
                narrative_degraded,
                generated_at,
                chart_url,
                report_url,
            },
        }
    }
}

/// Markdown to HTML. Model output is untrusted, so HTML blocks and inline
/// tags are emitted as escaped text.
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
