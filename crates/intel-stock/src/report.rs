//! One-page PDF executive report
//!
//! Layout on A4 portrait: centred title, a "Market Snapshot" block with the
//! four headline metrics, "The Bottom Line" excerpt of the narrative and the
//! price chart at the bottom. If the chart cannot be rasterised the page
//! carries a short italic note in its place and the export still succeeds.

use crate::chart::{ChartSize, PriceSeries, RasterImage, render_raster};
use crate::error::{Result, StockError};
use crate::market::StatsOutcome;
use crate::session::AnalysisSnapshot;
use crate::symbol::TickerSymbol;
use printpdf::image_crate::{DynamicImage, RgbImage};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference,
};
use regex::Regex;
use tracing::{debug, instrument, warn};

pub const REPORT_MIME: &str = "application/pdf";

/// Characters of narrative kept when the text has no "Bottom Line" section
pub const EXCERPT_FALLBACK_CHARS: usize = 300;

const BOTTOM_LINE_HEADING: &str = "Bottom Line";
const KEY_DRIVERS_HEADING: &str = "Key Drivers";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const CHART_WIDTH: f32 = 190.0;
const WRAP_COLUMNS: usize = 95;
const MM_PER_INCH: f32 = 25.4;
/// Helvetica averages about half an em per glyph
const AVG_GLYPH_EM: f32 = 0.5;
const MM_PER_PT: f32 = 0.3528;

/// Download name for a ticker's report
pub fn report_filename(ticker: &TickerSymbol) -> String {
    format!("{ticker}_Report.pdf")
}

/// Strip non-ASCII characters and markdown emphasis so the built-in PDF fonts
/// can render the text
pub fn clean_text(text: &str) -> Result<String> {
    let non_ascii = Regex::new(r"[^\x00-\x7F]+")
        .map_err(|e| StockError::Export(format!("text filter: {e}")))?;
    let ascii = non_ascii.replace_all(text, "");
    Ok(ascii.replace(['#', '*'], "").trim().to_string())
}

/// The part of the narrative after its last "Bottom Line" heading and
/// before "Key Drivers"; without the heading, the opening characters
pub fn bottom_line_excerpt(text: &str) -> Result<String> {
    match text.rsplit_once(BOTTOM_LINE_HEADING) {
        Some((_, tail)) => {
            let section = tail.split(KEY_DRIVERS_HEADING).next().unwrap_or(tail);
            clean_text(section)
        },
        None => {
            let head: String = text.chars().take(EXCERPT_FALLBACK_CHARS).collect();
            Ok(format!("{}...", clean_text(&head)?))
        },
    }
}

/// Everything the report needs
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub snapshot: &'a AnalysisSnapshot,
    /// Series for the chart, `None` when it could not be fetched
    pub series: Option<&'a PriceSeries>,
}

/// Writes [`ReportInput`]s as PDF bytes
#[derive(Debug, Clone, Copy)]
pub struct ReportExporter {
    chart_size: ChartSize,
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self {
            chart_size: ChartSize::REPORT,
        }
    }
}

fn export_err<E: std::fmt::Display>(err: E) -> StockError {
    StockError::Export(err.to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl ReportExporter {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip_all, fields(ticker = %input.snapshot.ticker))]
    pub fn export(&self, input: &ReportInput<'_>) -> Result<Vec<u8>> {
        let snapshot = input.snapshot;
        let title = format!("Executive Stock Report: {}", snapshot.ticker);

        let (doc, page, layer) =
            PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(export_err)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(export_err)?,
            italic: doc
                .add_builtin_font(BuiltinFont::HelveticaOblique)
                .map_err(export_err)?,
        };

        let mut y = PAGE_HEIGHT - 17.0;
        layer.use_text(&title, 16.0, Mm(centered_x(&title, 16.0)), Mm(y), &fonts.bold);
        y -= 15.0;

        layer.use_text("Market Snapshot", 12.0, Mm(MARGIN), Mm(y), &fonts.bold);
        y -= 8.0;
        for line in snapshot_lines(snapshot) {
            layer.use_text(format!("- {}", clean_text(&line)?), 11.0, Mm(MARGIN), Mm(y), &fonts.regular);
            y -= 6.0;
        }
        y -= 6.0;

        layer.use_text("The Bottom Line", 12.0, Mm(MARGIN), Mm(y), &fonts.bold);
        y -= 7.0;

        let chart_height = CHART_WIDTH * self.chart_size.height as f32 / self.chart_size.width as f32;
        let chart_top = MARGIN + chart_height;
        let excerpt = bottom_line_excerpt(&snapshot.narrative.text)?;
        let max_lines = ((y - chart_top - 6.0) / 5.0).max(1.0) as usize;
        for line in wrap_text(&excerpt, WRAP_COLUMNS, max_lines) {
            layer.use_text(line, 10.0, Mm(MARGIN), Mm(y), &fonts.regular);
            y -= 5.0;
        }

        match self.chart_raster(input.series) {
            Ok(raster) => place_chart(&layer, raster)?,
            Err(e) => {
                warn!("Chart omitted from report: {e}");
                let note = format!("(Visual chart could not be rendered: {e})");
                layer.use_text(clean_text(&note)?, 8.0, Mm(MARGIN), Mm(y - 4.0), &fonts.italic);
            },
        }

        let bytes = doc.save_to_bytes().map_err(export_err)?;
        debug!("Report written ({} bytes)", bytes.len());
        Ok(bytes)
    }

    fn chart_raster(&self, series: Option<&PriceSeries>) -> Result<RasterImage> {
        let series =
            series.ok_or_else(|| StockError::Render("price data unavailable".to_string()))?;
        render_raster(series, self.chart_size)
    }
}

fn snapshot_lines(snapshot: &AnalysisSnapshot) -> Vec<String> {
    let sentiment = format!("Sentiment: {}", snapshot.sentiment.display());
    match &snapshot.stats {
        StatsOutcome::Stats(stats) => vec![
            format!("Current Price: ${:.2}", stats.price),
            format!("20-Day MA: ${:.2}", stats.ma_20),
            format!("Technical Signal: {}", stats.trend),
            sentiment,
        ],
        StatsOutcome::Error { error } => vec![
            format!("Current Price: N/A ({error})"),
            "20-Day MA: N/A".to_string(),
            "Technical Signal: N/A".to_string(),
            sentiment,
        ],
    }
}

fn place_chart(layer: &PdfLayerReference, raster: RasterImage) -> Result<()> {
    let width_px = raster.width;
    let rgb = RgbImage::from_raw(raster.width, raster.height, raster.pixels)
        .ok_or_else(|| StockError::Export("chart buffer does not match its size".to_string()))?;
    let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(rgb));

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN)),
            translate_y: Some(Mm(MARGIN)),
            dpi: Some(width_px as f32 * MM_PER_INCH / CHART_WIDTH),
            ..Default::default()
        },
    );
    Ok(())
}

fn centered_x(text: &str, size_pt: f32) -> f32 {
    let width = text.chars().count() as f32 * size_pt * AVG_GLYPH_EM * MM_PER_PT;
    ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
}

/// Greedy word wrap; the last kept line gets an ellipsis when text is cut
fn wrap_text(text: &str, columns: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > columns {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push_str(" ...");
        }
    }
    lines
}
