//! Two-panel price chart drawn with plotters
//!
//! Top panel (70%): candlesticks with the orange 20-period SMA. Bottom panel
//! (30%): volume bars coloured by the bar's direction. Both panels share the
//! bar-index x axis so gaps between sessions do not stretch the chart.

use super::PriceSeries;
use crate::error::{Result, StockError};
use crate::market::Bar;
use crate::symbol::Timeframe;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Volume bar colour when the bar closed at or above its open
pub const UP_COLOR: RGBColor = RGBColor(0x26, 0xa6, 0x9a);
/// Volume bar colour when the bar closed below its open
pub const DOWN_COLOR: RGBColor = RGBColor(0xef, 0x53, 0x50);
pub const SMA_COLOR: RGBColor = RGBColor(0xff, 0xa5, 0x00);

const BACKGROUND: RGBColor = RGBColor(0x0e, 0x11, 0x17);
const GRID: RGBColor = RGBColor(0x2a, 0x2e, 0x39);
const TEXT: RGBColor = RGBColor(0xd1, 0xd4, 0xdc);

const FONT: &str = "sans-serif";
const Y_LABEL_AREA: u32 = 64;

/// Output size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl ChartSize {
    pub const WEB: Self = Self {
        width: 1000,
        height: 560,
    };
    pub const REPORT: Self = Self {
        width: 900,
        height: 480,
    };
}

impl Default for ChartSize {
    fn default() -> Self {
        Self::WEB
    }
}

/// Packed 8-bit RGB pixels, row major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

fn render_err<E: std::fmt::Display>(err: E) -> StockError {
    StockError::Render(err.to_string())
}

/// Draw `series` as an SVG document.
///
/// An empty series yields a placeholder panel with an explanation.
pub fn render_svg(series: &PriceSeries, size: ChartSize) -> Result<String> {
    if series.is_empty() {
        return render_message_svg(
            &format!("No price data available for {} over {}", series.symbol, series.timeframe),
            size,
        );
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (size.width, size.height)).into_drawing_area();
        draw_chart(&root, series)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Draw `series` into an RGB buffer for embedding in documents
pub fn render_raster(series: &PriceSeries, size: ChartSize) -> Result<RasterImage> {
    if series.is_empty() {
        return Err(StockError::Render(format!(
            "no price data for {} over {}",
            series.symbol, series.timeframe
        )));
    }

    let mut pixels = vec![0_u8; size.width as usize * size.height as usize * 3];
    {
        let root =
            BitMapBackend::with_buffer(&mut pixels, (size.width, size.height)).into_drawing_area();
        draw_chart(&root, series)?;
        root.present().map_err(render_err)?;
    }

    Ok(RasterImage {
        width: size.width,
        height: size.height,
        pixels,
    })
}

/// Placeholder panel carrying a single centred message
pub fn render_message_svg(message: &str, size: ChartSize) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (size.width, size.height)).into_drawing_area();
        root.fill(&BACKGROUND).map_err(render_err)?;

        let style = (FONT, 18)
            .into_font()
            .color(&TEXT)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let center = ((size.width / 2) as i32, (size.height / 2) as i32);
        root.draw_text(message, &style, center).map_err(render_err)?;
        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, series: &PriceSeries) -> Result<()> {
    root.fill(&BACKGROUND).map_err(render_err)?;

    let (width, height) = root.dim_in_pixel();
    let (upper, lower) = root.split_vertically((f64::from(height) * 0.7) as i32);

    let n = series.len();
    let x_range = -0.5_f64..(n as f64 - 0.5);
    let (lo, hi) = series.price_range().unwrap_or((0.0, 1.0));
    let pad = ((hi - lo) * 0.05).max(0.01);

    let mut price_chart = ChartBuilder::on(&upper)
        .margin(10)
        .caption(
            format!("{} ({})", series.symbol, series.timeframe),
            (FONT, 20).into_font().color(&TEXT),
        )
        .x_label_area_size(0)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range.clone(), (lo - pad)..(hi + pad))
        .map_err(render_err)?;

    price_chart
        .configure_mesh()
        .disable_x_mesh()
        .y_labels(6)
        .y_label_formatter(&|v| format!("{v:.2}"))
        .label_style((FONT, 12).into_font().color(&TEXT))
        .axis_style(&GRID)
        .bold_line_style(&GRID)
        .light_line_style(&GRID.mix(0.4))
        .draw()
        .map_err(render_err)?;

    let body_width = candle_width(width, n);
    price_chart
        .draw_series(series.bars.iter().enumerate().map(|(i, bar)| {
            CandleStick::new(
                i as f64,
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                UP_COLOR.filled(),
                DOWN_COLOR.filled(),
                body_width,
            )
        }))
        .map_err(render_err)?;

    let sma_points: Vec<(f64, f64)> = series
        .sma_20
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect();
    if !sma_points.is_empty() {
        price_chart
            .draw_series(LineSeries::new(sma_points, SMA_COLOR.stroke_width(2)))
            .map_err(render_err)?
            .label("20-Day SMA")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], SMA_COLOR.stroke_width(2)));

        price_chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&BACKGROUND.mix(0.8))
            .border_style(&GRID)
            .label_font((FONT, 12).into_font().color(&TEXT))
            .draw()
            .map_err(render_err)?;
    }

    let max_volume = series.max_volume().max(1) as f64;
    let mut volume_chart = ChartBuilder::on(&lower)
        .margin(10)
        .x_label_area_size(28)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range, 0.0..max_volume * 1.1)
        .map_err(render_err)?;

    let tick_labels: Vec<String> = series
        .bars
        .iter()
        .map(|bar| tick_label(bar, series.timeframe))
        .collect();
    volume_chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(6)
        .x_label_formatter(&|x| label_at(&tick_labels, *x))
        .y_labels(3)
        .y_label_formatter(&|v| compact_volume(*v))
        .label_style((FONT, 12).into_font().color(&TEXT))
        .axis_style(&GRID)
        .bold_line_style(&GRID)
        .light_line_style(&GRID.mix(0.4))
        .draw()
        .map_err(render_err)?;

    volume_chart
        .draw_series(series.bars.iter().enumerate().map(|(i, bar)| {
            let color = if bar.is_up() { UP_COLOR } else { DOWN_COLOR };
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, bar.volume as f64)], color.filled())
        }))
        .map_err(render_err)?;

    Ok(())
}

/// Candle body width in pixels for `n` bars across `width`
fn candle_width(width: u32, n: usize) -> u32 {
    if n == 0 {
        return 1;
    }
    let plot_width = f64::from(width.saturating_sub(Y_LABEL_AREA + 20));
    (plot_width / n as f64 * 0.6).clamp(1.0, 24.0) as u32
}

fn tick_label(bar: &Bar, timeframe: Timeframe) -> String {
    let format = match timeframe {
        Timeframe::OneDay => "%H:%M",
        Timeframe::OneWeek => "%m-%d %H:%M",
        Timeframe::FiveYears => "%Y-%m",
        Timeframe::OneMonth | Timeframe::SixMonths | Timeframe::OneYear => "%Y-%m-%d",
    };
    bar.timestamp.format(format).to_string()
}

/// Label for an axis position; only whole bar indices get one
fn label_at(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

fn compact_volume(v: f64) -> String {
    if v >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.0}K", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::fixtures::bars_from_closes;
    use crate::symbol::TickerSymbol;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::new(
            TickerSymbol::parse("AAPL").unwrap(),
            Timeframe::OneMonth,
            bars_from_closes(closes),
        )
    }

    #[test]
    fn test_compact_volume() {
        assert_eq!(compact_volume(950.0), "950");
        assert_eq!(compact_volume(12_400.0), "12K");
        assert_eq!(compact_volume(3_240_000.0), "3.2M");
        assert_eq!(compact_volume(1_500_000_000.0), "1.5B");
    }

    #[test]
    fn test_label_at_whole_indices_only() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(label_at(&labels, 1.0), "b");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, -0.5), "");
        assert_eq!(label_at(&labels, 7.0), "");
    }

    #[test]
    fn test_tick_label_by_timeframe() {
        let bar = &bars_from_closes(&[1.0])[0];
        assert_eq!(tick_label(bar, Timeframe::OneMonth), "2024-01-02");
        assert_eq!(tick_label(bar, Timeframe::OneDay), "21:00");
        assert_eq!(tick_label(bar, Timeframe::FiveYears), "2024-01");
    }

    #[test]
    fn test_candle_width_bounds() {
        assert_eq!(candle_width(1000, 0), 1);
        assert_eq!(candle_width(1000, 5), 24);
        assert_eq!(candle_width(1000, 10_000), 1);
    }

    #[test]
    fn test_message_svg() {
        let svg = render_message_svg("No price data", ChartSize::WEB).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("No price data"));
    }

    #[test]
    fn test_empty_series() {
        let empty = series(&[]);
        let svg = render_svg(&empty, ChartSize::WEB).unwrap();
        assert!(svg.contains("No price data available for AAPL"));
        assert!(matches!(
            render_raster(&empty, ChartSize::REPORT),
            Err(StockError::Render(_))
        ));
    }

    #[test]
    #[ignore = "requires system fonts"]
    fn test_render_svg_panels() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + f64::from(i % 7)).collect();
        let svg = render_svg(&series(&closes), ChartSize::WEB).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("AAPL (1M)"));
        assert!(svg.contains("20-Day SMA"));
    }

    #[test]
    #[ignore = "requires system fonts"]
    fn test_render_raster_dimensions() {
        let size = ChartSize {
            width: 320,
            height: 200,
        };
        let image = render_raster(&series(&[1.0, 2.0, 3.0]), size).unwrap();
        assert_eq!(image.pixels.len(), 320 * 200 * 3);
    }
}
