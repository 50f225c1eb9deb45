//! Three-panel price chart, drawn onto any Plotters backend.
//!
//! The same drawing code produces the PNG artifact (bitmap backend) and the
//! terminal preview (Ratatui backend); only `PanelStyle` differs.
//!
//! Panels, top to bottom:
//! 1. closing price
//! 2. volume bars
//! 3. closing price with the short/long moving averages

use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use super::axis::CalendarAxis;
use super::fonts::FONT_FAMILY;
use crate::domain::{LONG_WINDOW, Market, QuoteTable, SHORT_WINDOW};

const CLOSE_COLOR: RGBColor = RGBColor(31, 119, 180);
const VOLUME_COLOR: RGBColor = RGBColor(44, 160, 44);
const MA_SHORT_COLOR: RGBColor = RGBColor(255, 127, 14);
const MA_LONG_COLOR: RGBColor = RGBColor(214, 39, 40);

/// Series and bounds for the three panels, computed outside the draw call.
#[derive(Debug, Clone)]
pub struct PanelData {
    pub axis: CalendarAxis,
    pub close: Vec<(NaiveDate, f64)>,
    pub volume: Vec<(NaiveDate, f64)>,
    pub ma_short: Vec<(NaiveDate, f64)>,
    pub ma_long: Vec<(NaiveDate, f64)>,
    pub price_bounds: (f64, f64),
    pub volume_max: f64,
    pub ticker: String,
    pub market: Market,
    pub short_window: usize,
    pub long_window: usize,
}

impl PanelData {
    /// `None` when the table has no rows.
    pub fn from_table(table: &QuoteTable, ticker: &str, market: Market) -> Option<Self> {
        let axis = CalendarAxis::new(table.first_date()?, table.last_date()?);
        let (short_window, long_window) = table.ma_windows.unwrap_or((SHORT_WINDOW, LONG_WINDOW));

        let close: Vec<_> = table.rows.iter().map(|r| (r.date, r.close)).collect();
        let volume: Vec<_> = table.rows.iter().map(|r| (r.date, r.volume)).collect();
        // Rows without a value are skipped; no zero-fill, no interpolation.
        let ma_short: Vec<_> = table.rows.iter().filter_map(|r| r.ma_short.map(|v| (r.date, v))).collect();
        let ma_long: Vec<_> = table.rows.iter().filter_map(|r| r.ma_long.map(|v| (r.date, v))).collect();

        let price_bounds = padded_bounds(
            close
                .iter()
                .chain(&ma_short)
                .chain(&ma_long)
                .map(|&(_, v)| v),
        );
        let volume_max = volume.iter().map(|&(_, v)| v).fold(0.0_f64, f64::max);

        Some(Self {
            axis,
            close,
            volume,
            ma_short,
            ma_long,
            price_bounds,
            volume_max,
            ticker: ticker.trim().to_string(),
            market,
            short_window,
            long_window,
        })
    }

    fn volume_bounds(&self) -> (f64, f64) {
        if self.volume_max.is_finite() && self.volume_max > 0.0 {
            (0.0, self.volume_max * 1.05)
        } else {
            (0.0, 1.0)
        }
    }
}

/// Min/max of `values` with 5% padding; flat or empty input still yields a usable range.
fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { (hi.abs() * 0.05).max(1.0) };
    (lo - pad, hi + pad)
}

/// Visual parameters that differ between the PNG and the terminal.
#[derive(Debug, Clone)]
pub struct PanelStyle {
    /// Draw captions, tick labels, axis descriptions and legends.
    pub text: bool,
    pub titles: bool,
    pub title_size: u32,
    pub label_size: u32,
    pub margin: u32,
    pub left_area: u32,
    pub bottom_area: u32,
    pub max_x_labels: usize,
    pub max_y_labels: usize,
    pub line_width: u32,
    pub foreground: RGBColor,
    pub background: RGBColor,
    pub grid: RGBColor,
}

impl PanelStyle {
    /// Raster output.
    pub fn image(text: bool) -> Self {
        Self {
            text,
            titles: text,
            title_size: 24,
            label_size: 14,
            margin: 12,
            left_area: if text { 90 } else { 0 },
            bottom_area: if text { 55 } else { 0 },
            max_x_labels: 12,
            max_y_labels: 6,
            line_width: 2,
            foreground: BLACK,
            background: WHITE,
            grid: RGBColor(220, 220, 220),
        }
    }

    /// Terminal cells are low-res, so keep label areas compact and skip titles.
    pub fn terminal(text: bool) -> Self {
        Self {
            text,
            titles: false,
            title_size: 10,
            label_size: 10,
            margin: 1,
            left_area: if text { 8 } else { 0 },
            bottom_area: if text { 2 } else { 0 },
            max_x_labels: 6,
            max_y_labels: 3,
            line_width: 1,
            foreground: WHITE,
            background: BLACK,
            grid: RGBColor(90, 90, 90),
        }
    }

    fn font<'a>(&self) -> TextStyle<'a> {
        (FONT_FAMILY, self.label_size).into_font().color(&self.foreground)
    }

    fn title_font<'a>(&self) -> TextStyle<'a> {
        (FONT_FAMILY, self.title_size).into_font().color(&self.foreground)
    }
}

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Draw the three stacked panels onto `root`.
pub fn draw_panels<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, data: &PanelData, style: &PanelStyle) -> DrawResult<DB> {
    let panels = root.split_evenly((3, 1));
    let (ticker, market) = (data.ticker.as_str(), data.market);

    // 1) Closing price.
    {
        let mut builder = panel_builder(&panels[0], style);
        if style.titles {
            builder.caption(format!("{ticker} Stock Performance ({market})"), style.title_font());
        }
        let (lo, hi) = data.price_bounds;
        let mut chart = builder.build_cartesian_2d(data.axis.clone(), lo..hi)?;
        draw_mesh(&mut chart, style, "Date (IST)", "Price", &format_price)?;

        chart
            .draw_series(LineSeries::new(data.close.iter().copied(), CLOSE_COLOR.stroke_width(style.line_width)))?
            .label(format!("{ticker} Closing Price ({market})"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CLOSE_COLOR.stroke_width(2)));
        draw_legend(&mut chart, style)?;
    }

    // 2) Volume.
    {
        let mut builder = panel_builder(&panels[1], style);
        let (lo, hi) = data.volume_bounds();
        let mut chart = builder.build_cartesian_2d(data.axis.clone(), lo..hi)?;
        draw_mesh(&mut chart, style, "Date (IST)", "Volume", &format_volume)?;

        chart
            .draw_series(data.volume.iter().map(|&(date, v)| {
                let next = date.succ_opt().unwrap_or(date);
                Rectangle::new([(date, 0.0), (next, v)], VOLUME_COLOR.filled())
            }))?
            .label(format!("{ticker} Volume ({market})"))
            .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 20, y + 4)], VOLUME_COLOR.filled()));
        draw_legend(&mut chart, style)?;
    }

    // 3) Close + moving averages.
    {
        let mut builder = panel_builder(&panels[2], style);
        let (lo, hi) = data.price_bounds;
        let mut chart = builder.build_cartesian_2d(data.axis.clone(), lo..hi)?;
        draw_mesh(&mut chart, style, "Date Month(IST)", "Price", &format_price)?;

        chart
            .draw_series(LineSeries::new(
                data.close.iter().copied(),
                CLOSE_COLOR.mix(0.7).stroke_width(style.line_width),
            ))?
            .label(format!("{ticker} Closing Price ({market})"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CLOSE_COLOR.mix(0.7).stroke_width(2)));
        chart
            .draw_series(LineSeries::new(data.ma_short.iter().copied(), MA_SHORT_COLOR.stroke_width(style.line_width)))?
            .label(format!("{}-Day MA", data.short_window))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MA_SHORT_COLOR.stroke_width(2)));
        chart
            .draw_series(LineSeries::new(data.ma_long.iter().copied(), MA_LONG_COLOR.stroke_width(style.line_width)))?
            .label(format!("{}-Day MA", data.long_window))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MA_LONG_COLOR.stroke_width(2)));
        draw_legend(&mut chart, style)?;
    }

    Ok(())
}

fn panel_builder<'a, 'b, DB: DrawingBackend>(area: &'a DrawingArea<DB, Shift>, style: &PanelStyle) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(area);
    builder
        .margin(style.margin)
        .set_label_area_size(LabelAreaPosition::Left, style.left_area)
        .set_label_area_size(LabelAreaPosition::Bottom, style.bottom_area);
    builder
}

fn draw_mesh<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<CalendarAxis, RangedCoordf64>>,
    style: &PanelStyle,
    x_desc: &str,
    y_desc: &str,
    fmt_y: &dyn Fn(&f64) -> String,
) -> DrawResult<DB> {
    let mut mesh = chart.configure_mesh();
    mesh.axis_style(&style.foreground)
        .bold_line_style(&style.grid)
        .light_line_style(&style.grid.mix(0.4));

    if style.text {
        mesh.x_labels(style.max_x_labels)
            .y_labels(style.max_y_labels)
            .x_desc(x_desc)
            .y_desc(y_desc)
            .y_label_formatter(fmt_y)
            .label_style(style.font());
    } else {
        // Any text would need a registered font.
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()
}

fn draw_legend<'a, DB: DrawingBackend + 'a>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<CalendarAxis, RangedCoordf64>>,
    style: &PanelStyle,
) -> DrawResult<DB> {
    if !style.text {
        return Ok(());
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&style.background.mix(0.8))
        .border_style(&style.foreground)
        .label_font(style.font())
        .draw()
}

fn format_price(v: &f64) -> String {
    format!("{v:.2}")
}

fn format_volume(v: &f64) -> String {
    let v = *v;
    if v.abs() >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if v.abs() >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v.abs() >= 1e3 {
        format!("{:.0}K", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}
