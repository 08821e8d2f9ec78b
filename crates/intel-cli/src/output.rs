//! Terminal tables

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use intel_stock::{AnalysisSnapshot, IndicatorReading, StatsOutcome, Timeframe, Trend};
use rust_decimal::Decimal;

fn new_table(headers: [&str; 2]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(headers[0]).fg(Color::Cyan),
            Cell::new(headers[1]).fg(Color::Green),
        ]);
    table
}

fn signed(delta: Decimal) -> String {
    if delta.is_sign_negative() {
        format!("{delta:.2}")
    } else {
        format!("+{delta:.2}")
    }
}

fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Bullish => Color::Green,
        Trend::Bearish => Color::Red,
    }
}

/// The four dashboard metrics
pub fn snapshot_table(snapshot: &AnalysisSnapshot) -> Table {
    let mut table = new_table(["Metric", "Value"]);

    match &snapshot.stats {
        StatsOutcome::Stats(stats) => {
            table.add_row(vec![
                Cell::new("Current Price"),
                Cell::new(format!("${:.2}", stats.price)),
            ]);
            table.add_row(vec![
                Cell::new("20-Day MA"),
                Cell::new(format!("${:.2} ({})", stats.ma_20, signed(stats.ma_gap()))),
            ]);
            table.add_row(vec![
                Cell::new("Technical Signal"),
                Cell::new(stats.trend.to_string()).fg(trend_color(stats.trend)),
            ]);
        },
        StatsOutcome::Error { error } => {
            table.add_row(vec![
                Cell::new("Market Data").fg(Color::Red),
                Cell::new(error).fg(Color::Red),
            ]);
        },
    }

    table.add_row(vec![
        Cell::new("Sentiment"),
        Cell::new(snapshot.sentiment.display()),
    ]);
    table
}

/// MACD and Bollinger readings
pub fn indicator_table(reading: &IndicatorReading, timeframe: Timeframe) -> Table {
    let mut table = new_table(["Indicator", "Value"]);
    table.add_row(vec![Cell::new("Timeframe"), Cell::new(timeframe.label())]);

    match reading {
        IndicatorReading::Ready(snapshot) => {
            let macd = snapshot.macd;
            let bands = snapshot.bollinger;
            table.add_row(vec![
                Cell::new("Last Close"),
                Cell::new(format!("{:.2}", snapshot.last_close)),
            ]);
            table.add_row(vec![
                Cell::new("MACD / Signal"),
                Cell::new(format!("{:.3} / {:.3}", macd.macd, macd.signal)),
            ]);
            table.add_row(vec![
                Cell::new("MACD Histogram"),
                Cell::new(format!("{:.3}", macd.histogram)).fg(if macd.is_bullish() {
                    Color::Green
                } else {
                    Color::Red
                }),
            ]);
            table.add_row(vec![
                Cell::new("Bollinger Bands"),
                Cell::new(format!(
                    "{:.2} / {:.2} / {:.2}",
                    bands.lower, bands.middle, bands.upper
                )),
            ]);
            if let Some(percent_b) = bands.percent_b(snapshot.last_close) {
                table.add_row(vec![
                    Cell::new("%B"),
                    Cell::new(format!("{percent_b:.2}")),
                ]);
            }
        },
        IndicatorReading::Insufficient { bars, required } => {
            table.add_row(vec![
                Cell::new("Status").fg(Color::Yellow),
                Cell::new(format!("Need {required} bars, got {bars}")).fg(Color::Yellow),
            ]);
        },
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use intel_stock::{
        NarrativeReport, SentimentReading, SentimentNote, StockStats, TickerSymbol,
    };
    use intel_stock::indicators::{BollingerReading, IndicatorSnapshot, MacdReading};
    use intel_stock::narrative::NarrativeFailure;
    use rust_decimal_macros::dec;

    fn snapshot(stats: StatsOutcome) -> AnalysisSnapshot {
        AnalysisSnapshot::new(
            TickerSymbol::parse("AAPL").unwrap(),
            stats,
            SentimentReading::neutral(SentimentNote::NoRecentNews),
            NarrativeReport::degraded(NarrativeFailure::NoMarketData),
        )
    }

    #[test]
    fn test_snapshot_table() {
        let stats = StockStats::new(TickerSymbol::parse("AAPL").unwrap(), dec!(187.23), dec!(181.46));
        let rendered = snapshot_table(&snapshot(StatsOutcome::Stats(stats))).to_string();

        assert!(rendered.contains("$187.23"));
        assert!(rendered.contains("$181.46 (+5.77)"));
        assert!(rendered.contains("Bullish"));
        assert!(rendered.contains("Neutral (No recent news found)"));
    }

    #[test]
    fn test_snapshot_table_error() {
        let rendered = snapshot_table(&snapshot(StatsOutcome::error("Invalid Ticker"))).to_string();
        assert!(rendered.contains("Invalid Ticker"));
        assert!(!rendered.contains("Current Price"));
    }

    #[test]
    fn test_indicator_table() {
        let reading = IndicatorReading::Ready(IndicatorSnapshot {
            last_close: 105.0,
            macd: MacdReading {
                macd: 1.25,
                signal: 1.0,
                histogram: 0.25,
            },
            bollinger: BollingerReading {
                upper: 110.0,
                middle: 100.0,
                lower: 90.0,
            },
        });
        let rendered = indicator_table(&reading, Timeframe::SixMonths).to_string();
        assert!(rendered.contains("6M"));
        assert!(rendered.contains("1.250 / 1.000"));
        assert!(rendered.contains("90.00 / 100.00 / 110.00"));
        assert!(rendered.contains("0.75"));

        let short = IndicatorReading::Insufficient { bars: 12, required: 30 };
        assert!(indicator_table(&short, Timeframe::OneMonth).to_string().contains("Need 30 bars, got 12"));
    }
}
