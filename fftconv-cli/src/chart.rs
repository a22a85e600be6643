//! Line charts: axes with ticks, grid, legend and a grid-of-axes figure.

use std::path::Path;

use image::{ImageResult, Rgb};

use crate::canvas::{Canvas, LineStyle, Marker, Rect, Stroke};
use crate::font::{text_height, text_width};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const GRID: Rgb<u8> = Rgb([176, 176, 176]);
const LEGEND_EDGE: Rgb<u8> = Rgb([204, 204, 204]);

/// Colour `Ci` of the default property cycle.
pub fn cycle(i: usize) -> Rgb<u8> {
    let c = colorous::CATEGORY10[i % colorous::CATEGORY10.len()];
    Rgb([c.r, c.g, c.b])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Linear,
    Log10,
}

impl Scale {
    fn forward(self, v: f64) -> Option<f64> {
        match self {
            Scale::Linear => v.is_finite().then_some(v),
            Scale::Log10 => (v > 0.0 && v.is_finite()).then(|| v.log10()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub color: Rgb<u8>,
    pub style: LineStyle,
    pub marker: Option<Marker>,
    pub width: u32,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
            color: BLUE,
            style: LineStyle::Solid,
            marker: None,
            width: 2,
        }
    }

    /// Series over `y` sampled at `x`; the shorter of the two wins.
    pub fn from_xy(label: impl Into<String>, x: &[f64], y: &[f64]) -> Self {
        Self::new(label, x.iter().copied().zip(y.iter().copied()).collect())
    }

    pub fn color(mut self, color: Rgb<u8>) -> Self {
        self.color = color;
        self
    }

    pub fn style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }
}

/// Axis range after scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    lo: f64,
    hi: f64,
}

impl Range {
    fn span(&self) -> f64 {
        self.hi - self.lo
    }

    /// Widen by `frac` of the span on both sides; degenerate ranges get ±0.5.
    fn padded(self, frac: f64) -> Self {
        let span = self.span();
        if span <= 0.0 {
            Range {
                lo: self.lo - 0.5,
                hi: self.hi + 0.5,
            }
        } else {
            Range {
                lo: self.lo - span * frac,
                hi: self.hi + span * frac,
            }
        }
    }
}

/// Step of roughly `raw` rounded to 1, 2 or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let nice = if norm < 1.5 {
        1.0
    } else if norm < 3.0 {
        2.0
    } else if norm < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * mag
}

/// Tick positions in scaled space with their labels.
fn ticks(range: Range, scale: Scale) -> Vec<(f64, String)> {
    match scale {
        Scale::Linear => {
            let step = nice_step(range.span() / 5.0);
            let decimals = (-step.log10().floor()).max(0.0) as usize;
            let first = (range.lo / step).ceil() as i64;
            let last = (range.hi / step).floor() as i64;
            (first..=last)
                .map(|k| {
                    let v = k as f64 * step;
                    let v = if v.abs() < step * 1e-9 { 0.0 } else { v };
                    (v, format!("{:.*}", decimals, v))
                })
                .collect()
        }
        Scale::Log10 => {
            let first = range.lo.ceil() as i64;
            let last = range.hi.floor() as i64;
            (first..=last)
                .map(|e| (e as f64, format!("10^{}", e)))
                .collect()
        }
    }
}

/// One plotting area.
#[derive(Debug, Clone, Default)]
pub struct Axes {
    title: Option<String>,
    x_label: Option<String>,
    y_label: Option<String>,
    x_scale: Scale,
    y_scale: Scale,
    x_limits: Option<(f64, f64)>,
    grid: bool,
    legend: bool,
    series: Vec<Series>,
}

const TICK_SCALE: u32 = 2;
const LABEL_SCALE: u32 = 2;
const TITLE_SCALE: u32 = 3;

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_x_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.x_label = Some(label.into());
        self
    }

    pub fn set_y_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.y_label = Some(label.into());
        self
    }

    pub fn set_x_scale(&mut self, scale: Scale) -> &mut Self {
        self.x_scale = scale;
        self
    }

    pub fn set_y_scale(&mut self, scale: Scale) -> &mut Self {
        self.y_scale = scale;
        self
    }

    pub fn set_x_limits(&mut self, lo: f64, hi: f64) -> &mut Self {
        self.x_limits = Some((lo, hi));
        self
    }

    pub fn grid(&mut self, on: bool) -> &mut Self {
        self.grid = on;
        self
    }

    pub fn legend(&mut self, on: bool) -> &mut Self {
        self.legend = on;
        self
    }

    pub fn plot(&mut self, series: Series) -> &mut Self {
        self.series.push(series);
        self
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn scaled_points<'a>(&'a self, s: &'a Series) -> impl Iterator<Item = (f64, f64)> + 'a {
        s.points.iter().filter_map(move |&(x, y)| {
            Some((self.x_scale.forward(x)?, self.y_scale.forward(y)?))
        })
    }

    fn x_range(&self) -> Range {
        if let Some((lo, hi)) = self.x_limits {
            if let (Some(lo), Some(hi)) = (self.x_scale.forward(lo), self.x_scale.forward(hi)) {
                return Range { lo, hi };
            }
        }
        self.data_range(|p| p.0).padded(0.05)
    }

    /// Y range of the points whose x falls inside the visible x range.
    fn y_range(&self, x: Range) -> Range {
        let visible = |p: &(f64, f64)| self.x_limits.is_none() || (p.0 >= x.lo && p.0 <= x.hi);
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for s in &self.series {
            for p in self.scaled_points(s).filter(visible) {
                lo = lo.min(p.1);
                hi = hi.max(p.1);
            }
        }
        if lo > hi {
            return Range { lo: 0.0, hi: 1.0 };
        }
        Range { lo, hi }.padded(0.05)
    }

    fn data_range(&self, pick: impl Fn(&(f64, f64)) -> f64) -> Range {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for s in &self.series {
            for p in self.scaled_points(s) {
                lo = lo.min(pick(&p));
                hi = hi.max(pick(&p));
            }
        }
        if lo > hi {
            Range { lo: 0.0, hi: 1.0 }
        } else {
            Range { lo, hi }
        }
    }

    /// Draw into `area` of `canvas`.
    pub fn render(&self, canvas: &mut Canvas, area: Rect) {
        let xr = self.x_range();
        let yr = self.y_range(xr);
        let x_ticks = ticks(xr, self.x_scale);
        let y_ticks = ticks(yr, self.y_scale);

        let pad = 6;
        let tick_h = text_height(TICK_SCALE);
        let label_h = text_height(LABEL_SCALE);
        let title_h = self.title.as_ref().map_or(0, |_| text_height(TITLE_SCALE) + pad);
        let y_tick_w = y_ticks
            .iter()
            .map(|(_, t)| text_width(t, TICK_SCALE))
            .max()
            .unwrap_or(0);
        let y_label_w = self.y_label.as_ref().map_or(0, |_| label_h + pad);
        let x_label_h = self.x_label.as_ref().map_or(0, |_| label_h + pad);

        let left = area.x + pad + y_label_w + y_tick_w + pad;
        let top = area.y + pad + title_h;
        let right = area.right() - pad * 2;
        let bottom = area.bottom() - pad - x_label_h - tick_h - pad;
        let plot = Rect::new(left, top, (right - left).max(1), (bottom - top).max(1));

        let to_px = |x: f64, y: f64| -> (i32, i32) {
            let fx = (x - xr.lo) / xr.span();
            let fy = (y - yr.lo) / yr.span();
            let px = plot.x as f64 + fx * (plot.width - 1) as f64;
            let py = plot.bottom() as f64 - 1.0 - fy * (plot.height - 1) as f64;
            (px.round() as i32, py.round() as i32)
        };

        if self.grid {
            for (v, _) in &x_ticks {
                let (px, _) = to_px(*v, yr.lo);
                canvas.draw_line(px, plot.y, px, plot.bottom() - 1, GRID);
            }
            for (v, _) in &y_ticks {
                let (_, py) = to_px(xr.lo, *v);
                canvas.draw_line(plot.x, py, plot.right() - 1, py, GRID);
            }
        }

        canvas.set_clip(Some(plot));
        for s in &self.series {
            let pts: Vec<(i32, i32)> = self
                .scaled_points(s)
                .map(|(x, y)| to_px(x, y))
                .collect();
            let stroke = Stroke {
                color: s.color,
                width: s.width,
                style: s.style,
            };
            canvas.draw_polyline(&pts, &stroke);
            if let Some(marker) = s.marker {
                for &(px, py) in &pts {
                    canvas.draw_marker(px, py, marker, 3, s.color);
                }
            }
        }
        canvas.set_clip(None);
        canvas.stroke_rect(plot, BLACK);

        for (v, label) in &x_ticks {
            let (px, _) = to_px(*v, yr.lo);
            canvas.draw_line(px, plot.bottom(), px, plot.bottom() + 3, BLACK);
            let w = text_width(label, TICK_SCALE);
            canvas.draw_text(px - w / 2, plot.bottom() + pad, label, TICK_SCALE, BLACK);
        }
        for (v, label) in &y_ticks {
            let (_, py) = to_px(xr.lo, *v);
            canvas.draw_line(plot.x - 4, py, plot.x - 1, py, BLACK);
            let w = text_width(label, TICK_SCALE);
            canvas.draw_text(plot.x - pad - w, py - tick_h / 2, label, TICK_SCALE, BLACK);
        }

        if let Some(title) = &self.title {
            let w = text_width(title, TITLE_SCALE);
            let x = plot.x + (plot.width - w) / 2;
            canvas.draw_text(x, area.y + pad, title, TITLE_SCALE, BLACK);
        }
        if let Some(label) = &self.x_label {
            let w = text_width(label, LABEL_SCALE);
            let y = plot.bottom() + pad + tick_h + pad;
            canvas.draw_text(plot.x + (plot.width - w) / 2, y, label, LABEL_SCALE, BLACK);
        }
        if let Some(label) = &self.y_label {
            let w = text_width(label, LABEL_SCALE);
            let y = plot.y + (plot.height + w) / 2;
            canvas.draw_text_vertical(area.x + pad, y, label, LABEL_SCALE, BLACK);
        }
        if self.legend {
            self.render_legend(canvas, plot);
        }
    }

    fn render_legend(&self, canvas: &mut Canvas, plot: Rect) {
        let labelled: Vec<&Series> = self.series.iter().filter(|s| !s.label.is_empty()).collect();
        if labelled.is_empty() {
            return;
        }
        let pad = 5;
        let sample_w = 24;
        let row_h = text_height(TICK_SCALE) + pad;
        let text_w = labelled
            .iter()
            .map(|s| text_width(&s.label, TICK_SCALE))
            .max()
            .unwrap_or(0);
        let w = pad * 3 + sample_w + text_w;
        let h = pad + row_h * labelled.len() as i32;
        let bx = Rect::new(plot.right() - w - pad, plot.y + pad, w, h);
        canvas.fill_rect(bx, WHITE);
        canvas.stroke_rect(bx, LEGEND_EDGE);
        for (i, s) in labelled.iter().enumerate() {
            let y = bx.y + pad + row_h * i as i32 + text_height(TICK_SCALE) / 2;
            let x0 = bx.x + pad;
            let stroke = Stroke {
                color: s.color,
                width: s.width,
                style: s.style,
            };
            canvas.draw_polyline(&[(x0, y), (x0 + sample_w, y)], &stroke);
            if let Some(marker) = s.marker {
                canvas.draw_marker(x0 + sample_w / 2, y, marker, 3, s.color);
            }
            canvas.draw_text(
                x0 + sample_w + pad,
                y - text_height(TICK_SCALE) / 2,
                &s.label,
                TICK_SCALE,
                BLACK,
            );
        }
    }
}

/// `rows × cols` grid of axes under an optional super-title.
#[derive(Debug, Clone)]
pub struct Figure {
    rows: usize,
    cols: usize,
    axes: Vec<Axes>,
    suptitle: Option<String>,
}

const SUPTITLE_SCALE: u32 = 4;

impl Figure {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            axes: vec![Axes::new(); rows * cols],
            suptitle: None,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn set_suptitle(&mut self, title: impl Into<String>) -> &mut Self {
        self.suptitle = Some(title.into());
        self
    }

    pub fn suptitle(&self) -> Option<&str> {
        self.suptitle.as_deref()
    }

    /// Axes at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the grid.
    pub fn axes_mut(&mut self, row: usize, col: usize) -> &mut Axes {
        assert!(row < self.rows && col < self.cols, "axes ({row}, {col}) out of range");
        &mut self.axes[row * self.cols + col]
    }

    pub fn axes(&self, row: usize, col: usize) -> Option<&Axes> {
        (row < self.rows && col < self.cols).then(|| &self.axes[row * self.cols + col])
    }

    pub fn render(&self, width: u32, height: u32) -> Canvas {
        let mut canvas = Canvas::new(width, height, WHITE);
        let mut top = 0;
        if let Some(title) = &self.suptitle {
            let pad = 10;
            let w = text_width(title, SUPTITLE_SCALE);
            canvas.draw_text((width as i32 - w) / 2, pad, title, SUPTITLE_SCALE, BLACK);
            top = text_height(SUPTITLE_SCALE) + 2 * pad;
        }
        if self.rows == 0 || self.cols == 0 {
            return canvas;
        }
        let cell_w = width as i32 / self.cols as i32;
        let cell_h = (height as i32 - top) / self.rows as i32;
        for r in 0..self.rows {
            for c in 0..self.cols {
                let area = Rect::new(c as i32 * cell_w, top + r as i32 * cell_h, cell_w, cell_h);
                self.axes[r * self.cols + c].render(&mut canvas, area);
            }
        }
        canvas
    }

    pub fn save_png(&self, path: &Path, width: u32, height: u32) -> ImageResult<()> {
        self.render(width, height).save_png(path)
    }
}
