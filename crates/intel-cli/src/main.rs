//! Command-line front end for the stock intelligence services

mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use intel_stock::chart::{ChartSize, render_message_svg, render_svg};
use intel_stock::{ChartView, Dashboard, DashboardConfig, TickerSymbol, Timeframe, report_filename};
use intel_utils::{init_tracing, load_dotenv};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "intel")]
#[command(about = "Stock intelligence: stats, headline sentiment, AI narrative, charts and reports", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch stats and sentiment and ask the model for an executive summary
    Analyze {
        ticker: TickerSymbol,
        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the price chart as SVG
    Chart {
        ticker: TickerSymbol,
        #[arg(short, long, default_value = "1M")]
        timeframe: Timeframe,
        #[arg(short, long, default_value = "chart.svg")]
        out: PathBuf,
    },
    /// Analyze and write the one-page PDF report
    Report {
        ticker: TickerSymbol,
        #[arg(short, long, default_value = "1M")]
        timeframe: Timeframe,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Show MACD and Bollinger Band readings
    Indicators {
        ticker: TickerSymbol,
        #[arg(short, long, default_value = "6M")]
        timeframe: Timeframe,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let args = Args::parse();
    let config = DashboardConfig::from_env().context("invalid configuration")?;
    let dashboard = Dashboard::from_config(config).context("failed to set up services")?;

    match args.command {
        Command::Analyze { ticker, json } => {
            let snapshot = dashboard.analyze(&ticker).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("{}", output::snapshot_table(&snapshot));
                println!("\n{}", snapshot.narrative.text);
            }
        },
        Command::Chart {
            ticker,
            timeframe,
            out,
        } => {
            let svg = match dashboard.chart(&ticker, timeframe).await {
                ChartView::Ready(series) => render_svg(&series, ChartSize::WEB)?,
                ChartView::Empty { message } | ChartView::Unavailable { message } => {
                    eprintln!("{message}");
                    render_message_svg(&message, ChartSize::WEB)?
                },
            };
            std::fs::write(&out, svg).with_context(|| format!("failed to write {}", out.display()))?;
            info!("Chart written to {}", out.display());
            println!("{}", out.display());
        },
        Command::Report {
            ticker,
            timeframe,
            out_dir,
        } => {
            let snapshot = dashboard.analyze(&ticker).await;
            let pdf = dashboard.report(&snapshot, timeframe).await?;
            let path = out_dir.join(report_filename(&ticker));
            std::fs::write(&path, pdf).with_context(|| format!("failed to write {}", path.display()))?;
            println!("{}", output::snapshot_table(&snapshot));
            println!("{}", path.display());
        },
        Command::Indicators { ticker, timeframe } => {
            let reading = dashboard.indicators(&ticker, timeframe).await?;
            println!("{}", output::indicator_table(&reading, timeframe));
        },
    }

    Ok(())
}
