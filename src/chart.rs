use super::console::TextDrawingBackend;
use super::error::RenderError;
use super::{suitable_xfmt, SpeedLog};
use chrono::prelude::*;
use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::io::{self, Write};
use std::ops::Range;
use std::path::Path;

pub const CHART_TITLE: &str = "Internet Speed Over Time";
pub const DEFAULT_DPI: u32 = 300;
/// point values are written next to the points only below this many records
pub const ANNOTATION_LIMIT: usize = 10;
pub const Y_PAD_BELOW: f64 = 0.9;
pub const Y_PAD_ABOVE: f64 = 1.1;
pub const MAX_X_LABELS: usize = 12;
/// characters the time axis holds before the tick labels are rotated
const X_LABEL_BUDGET: usize = 110;
const CANVAS_INCHES: (u32, u32) = (12, 6);
const SCREEN_COLS: u32 = 100;
const SCREEN_ROWS: u32 = 30;

const DOWNLOAD_COLOR: RGBColor = RGBColor(52, 152, 219);
const UPLOAD_COLOR: RGBColor = RGBColor(231, 76, 60);

/// Everything about the chart that depends on the data only,
/// shared by all the renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub x_min: NaiveDateTime,
    pub x_max: NaiveDateTime,
    pub y_min: f64,
    pub y_max: f64,
    pub x_format: &'static str,
    pub x_labels: usize,
    /// width of one formatted tick label, in characters
    pub x_label_chars: usize,
    pub rotate_x_labels: bool,
    pub annotate: bool,
}

impl ChartLayout {
    /// None for an empty log, there is nothing to draw
    pub fn for_log(speed_log: &SpeedLog) -> Option<ChartLayout> {
        let (tmin, tmax) = speed_log.time_bounds()?;
        let (smin, smax) = speed_log.speed_bounds()?;
        let xspan: chrono::Duration = tmax - tmin;
        let xmargin = if xspan > chrono::Duration::zero() {
            xspan / 20
        } else {
            chrono::Duration::minutes(30)
        };
        let x_format = suitable_xfmt(xspan);
        let x_label_chars = tmin.format(x_format).to_string().chars().count();
        let x_labels = speed_log.len().max(2).min(MAX_X_LABELS);
        Some(ChartLayout {
            x_min: tmin - xmargin,
            x_max: tmax + xmargin,
            y_min: smin * Y_PAD_BELOW,
            y_max: smax * Y_PAD_ABOVE,
            x_format,
            x_labels,
            x_label_chars,
            rotate_x_labels: x_labels * (x_label_chars + 2) > X_LABEL_BUDGET,
            annotate: speed_log.len() < ANNOTATION_LIMIT,
        })
    }

    /// drawn y range; only an all-zero log collapses the padded one
    pub fn y_range(&self) -> Range<f64> {
        if self.y_max > self.y_min {
            self.y_min..self.y_max
        } else {
            self.y_min - 1.0..self.y_max + 1.0
        }
    }
}

/// Sizes for one drawing target, in backend pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub size: (u32, u32),
    pub margin: u32,
    pub title_font: f64,
    pub label_font: f64,
    pub annotation_font: f64,
    pub x_label_area: u32,
    pub y_label_area: u32,
    pub marker_size: u32,
    pub stroke_width: u32,
    pub legend_len: i32,
    pub grid: bool,
    /// one character per pixel, text cannot be rotated
    pub cells: bool,
}

impl ChartStyle {
    /// 12 x 6 inch canvas, fonts and lines sized in points for the given dpi
    pub fn print(dpi: u32) -> ChartStyle {
        let pt = |points: f64| points * dpi as f64 / 72.;
        let px = |points: f64| pt(points).round() as u32;
        ChartStyle {
            size: (CANVAS_INCHES.0 * dpi, CANVAS_INCHES.1 * dpi),
            margin: px(12.),
            title_font: pt(16.),
            label_font: pt(12.),
            annotation_font: pt(9.),
            x_label_area: px(36.),
            y_label_area: px(48.),
            marker_size: px(3.),
            stroke_width: px(2.),
            legend_len: px(20.) as i32,
            grid: true,
            cells: false,
        }
    }

    pub fn terminal(cols: u32, rows: u32) -> ChartStyle {
        ChartStyle {
            size: (cols, rows),
            margin: 1,
            title_font: 1.,
            label_font: 1.,
            annotation_font: 1.,
            x_label_area: 2,
            y_label_area: 8,
            marker_size: 0,
            stroke_width: 1,
            legend_len: 3,
            grid: false,
            cells: true,
        }
    }
}

/// Draws the chart somewhere. `save` writes an image file, `show` presents it to the user.
pub trait ChartRenderer {
    fn save(
        &mut self,
        speed_log: &SpeedLog,
        layout: &ChartLayout,
        path: &Path,
    ) -> Result<(), RenderError>;

    fn show(&mut self, speed_log: &SpeedLog, layout: &ChartLayout) -> Result<(), RenderError>;
}

pub struct Screen<W: Write> {
    sink: W,
    cols: u32,
    rows: u32,
}

/// PNG files through the bitmap backend, screen output as text
pub struct PlottersRenderer<W: Write> {
    dpi: u32,
    screen: Option<Screen<W>>,
}

impl PlottersRenderer<io::Stdout> {
    pub fn new(dpi: u32) -> Self {
        PlottersRenderer::with_screen(dpi, io::stdout(), SCREEN_COLS, SCREEN_ROWS)
    }
}

impl<W: Write> PlottersRenderer<W> {
    pub fn with_screen(dpi: u32, sink: W, cols: u32, rows: u32) -> Self {
        PlottersRenderer {
            dpi,
            screen: Some(Screen { sink, cols, rows }),
        }
    }

    pub fn without_screen(self) -> Self {
        PlottersRenderer {
            screen: None,
            ..self
        }
    }
}

impl<W: Write> ChartRenderer for PlottersRenderer<W> {
    fn save(
        &mut self,
        speed_log: &SpeedLog,
        layout: &ChartLayout,
        path: &Path,
    ) -> Result<(), RenderError> {
        let style = ChartStyle::print(self.dpi);
        debug!(
            "drawing {}x{} px chart at {} dpi",
            style.size.0, style.size.1, self.dpi
        );
        let root = BitMapBackend::new(path, style.size).into_drawing_area();
        draw_speed_chart(root, speed_log, layout, &style)?;
        info!("chart written to {}", path.display());
        Ok(())
    }

    fn show(&mut self, speed_log: &SpeedLog, layout: &ChartLayout) -> Result<(), RenderError> {
        let screen = match self.screen.as_mut() {
            Some(s) => s,
            None => {
                debug!("screen output disabled");
                return Ok(());
            }
        };
        let style = ChartStyle::terminal(screen.cols, screen.rows);
        let root = TextDrawingBackend::new(&mut screen.sink, screen.cols, screen.rows)
            .into_drawing_area();
        draw_speed_chart(root, speed_log, layout, &style)
    }
}

fn utc(t: NaiveDateTime) -> DateTime<Utc> {
    TimeZone::from_utc_datetime(&Utc, &t)
}

/// plots download and upload against time, on any backend
pub fn draw_speed_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    speed_log: &SpeedLog,
    layout: &ChartLayout,
    style: &ChartStyle,
) -> Result<(), RenderError> {
    let rotate = layout.rotate_x_labels && !style.cells;
    let x_labels = if style.cells {
        let fit = style.size.0 as usize / (layout.x_label_chars + 2);
        layout.x_labels.min(fit.max(2))
    } else {
        layout.x_labels
    };
    let x_label_area = if rotate {
        let label_len = layout.x_label_chars as f64 * 0.6 * style.label_font;
        (label_len + style.label_font * 2.) as u32
    } else {
        style.x_label_area
    };

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(style.margin)
        .caption(CHART_TITLE, ("sans-serif", style.title_font))
        .x_label_area_size(x_label_area)
        .y_label_area_size(style.y_label_area)
        .build_cartesian_2d(utc(layout.x_min)..utc(layout.x_max), layout.y_range())?;

    let label_font = ("sans-serif", style.label_font).into_font();
    let x_label_font = if rotate {
        label_font.clone().transform(FontTransform::Rotate90)
    } else {
        label_font.clone()
    };
    let grid = if style.grid {
        RGBColor(150, 150, 150).mix(0.3).stroke_width(1)
    } else {
        TRANSPARENT.stroke_width(1)
    };
    let xfmt = layout.x_format;
    chart
        .configure_mesh()
        .light_line_style(&TRANSPARENT)
        .bold_line_style(grid)
        .set_all_tick_mark_size(2)
        .label_style(label_font)
        .x_label_style(x_label_font)
        .x_labels(x_labels)
        .x_label_formatter(&|x: &DateTime<Utc>| x.format(xfmt).to_string())
        .y_label_formatter(&|y: &f64| format!("{:.0}", y))
        .x_desc("Timestamp")
        .y_desc("Speed (Mbps)")
        .draw()?;

    let records = speed_log.records();
    let (stroke, legend_len) = (style.stroke_width, style.legend_len);
    chart
        .draw_series(LineSeries::new(
            records.iter().map(|m| (utc(m.timestamp), m.download_mbps())),
            DOWNLOAD_COLOR.stroke_width(stroke),
        ))?
        .label("Download")
        .legend(move |(x, y)| {
            PathElement::new(
                vec![(x, y), (x + legend_len, y)],
                DOWNLOAD_COLOR.stroke_width(stroke),
            )
        });
    chart
        .draw_series(LineSeries::new(
            records.iter().map(|m| (utc(m.timestamp), m.upload_mbps())),
            UPLOAD_COLOR.stroke_width(stroke),
        ))?
        .label("Upload")
        .legend(move |(x, y)| {
            PathElement::new(
                vec![(x, y), (x + legend_len, y)],
                UPLOAD_COLOR.stroke_width(stroke),
            )
        });

    if style.marker_size > 0 {
        let s = style.marker_size as i32;
        chart.draw_series(records.iter().map(|m| {
            Circle::new(
                (utc(m.timestamp), m.download_mbps()),
                style.marker_size,
                DOWNLOAD_COLOR.filled(),
            )
        }))?;
        chart.draw_series(records.iter().map(|m| {
            EmptyElement::at((utc(m.timestamp), m.upload_mbps()))
                + Rectangle::new([(-s, -s), (s, s)], UPLOAD_COLOR.filled())
        }))?;
    }

    if layout.annotate {
        let font = ("sans-serif", style.annotation_font)
            .into_font()
            .color(&BLACK);
        let above = font.pos(Pos::new(HPos::Center, VPos::Bottom));
        let below = font.pos(Pos::new(HPos::Center, VPos::Top));
        chart.draw_series(records.iter().map(|m| {
            Text::new(
                format!("{:.2}", m.download_mbps()),
                (utc(m.timestamp), m.download_mbps()),
                above.clone(),
            )
        }))?;
        chart.draw_series(records.iter().map(|m| {
            Text::new(
                format!("{:.2}", m.upload_mbps()),
                (utc(m.timestamp), m.upload_mbps()),
                below.clone(),
            )
        }))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", style.label_font))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}
