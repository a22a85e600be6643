//! Raster drawing primitives on top of an RGB image buffer.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ImageBuffer, ImageEncoder, ImageResult, Rgb, RgbImage};

use crate::font::{glyph, ADVANCE};

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

impl LineStyle {
    /// `(on, off)` run lengths in pixels, `None` for a continuous line.
    fn dash(self, width: u32) -> Option<(u32, u32)> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some((4 * width.max(1) + 2, 2 * width.max(1) + 1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Cross,
}

/// How a line is stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb<u8>,
    pub width: u32,
    pub style: LineStyle,
}

impl Stroke {
    pub fn solid(color: Rgb<u8>, width: u32) -> Self {
        Self {
            color,
            width,
            style: LineStyle::Solid,
        }
    }
}

pub struct Canvas {
    img: RgbImage,
    clip: Option<Rect>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self {
            img: ImageBuffer::from_pixel(width, height, background),
            clip: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.img
    }

    /// Restrict drawing to `clip`; `None` lifts the restriction.
    pub fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    pub fn put(&mut self, x: i32, y: i32, color: Rgb<u8>) {
        if x < 0 || y < 0 || x >= self.img.width() as i32 || y >= self.img.height() as i32 {
            return;
        }
        if self.clip.is_some_and(|c| !c.contains(x, y)) {
            return;
        }
        self.img.put_pixel(x as u32, y as u32, color);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgb<u8>) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.put(x, y, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Rgb<u8>) {
        let (r, b) = (rect.right() - 1, rect.bottom() - 1);
        self.draw_line(rect.x, rect.y, r, rect.y, color);
        self.draw_line(rect.x, b, r, b, color);
        self.draw_line(rect.x, rect.y, rect.x, b, color);
        self.draw_line(r, rect.y, r, b, color);
    }

    /// Square pen of side `width` centred on `(x, y)`.
    fn dab(&mut self, x: i32, y: i32, width: u32, color: Rgb<u8>) {
        let w = width.max(1) as i32;
        let off = (w - 1) / 2;
        for dy in 0..w {
            for dx in 0..w {
                self.put(x - off + dx, y - off + dy, color);
            }
        }
    }

    /// One-pixel Bresenham line.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
        let mut phase = 0;
        self.segment(x0, y0, x1, y1, &Stroke::solid(color, 1), &mut phase);
    }

    /// Bresenham segment; `phase` carries the dash position across segments.
    fn segment(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, stroke: &Stroke, phase: &mut u32) {
        let dash = stroke.style.dash(stroke.width);
        let (mut x, mut y) = (x0, y0);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            let on = match dash {
                None => true,
                Some((on, off)) => *phase % (on + off) < on,
            };
            if on {
                self.dab(x, y, stroke.width, stroke.color);
            }
            if x == x1 && y == y1 {
                break;
            }
            *phase = phase.wrapping_add(1);
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Connected line through `points`, dashes continuing across joints.
    pub fn draw_polyline(&mut self, points: &[(i32, i32)], stroke: &Stroke) {
        let mut phase = 0;
        if let [(x, y)] = points {
            self.dab(*x, *y, stroke.width, stroke.color);
        }
        for w in points.windows(2) {
            self.segment(w[0].0, w[0].1, w[1].0, w[1].1, stroke, &mut phase);
        }
    }

    pub fn draw_marker(&mut self, x: i32, y: i32, marker: Marker, radius: i32, color: Rgb<u8>) {
        match marker {
            Marker::Circle => {
                for dy in -radius..=radius {
                    for dx in -radius..=radius {
                        if dx * dx + dy * dy <= radius * radius {
                            self.put(x + dx, y + dy, color);
                        }
                    }
                }
            }
            Marker::Cross => {
                let stroke = Stroke::solid(color, 2);
                let mut phase = 0;
                self.segment(x - radius, y - radius, x + radius, y + radius, &stroke, &mut phase);
                self.segment(x - radius, y + radius, x + radius, y - radius, &stroke, &mut phase);
            }
        }
    }

    pub fn draw_char(&mut self, x: i32, y: i32, ch: char, scale: u32, color: Rgb<u8>) {
        let scale = scale as i32;
        for (dy, row) in glyph(ch).iter().enumerate() {
            for (dx, c) in row.chars().enumerate() {
                if c != '#' {
                    continue;
                }
                let px0 = x + dx as i32 * scale;
                let py0 = y + dy as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        self.put(px0 + sx, py0 + sy, color);
                    }
                }
            }
        }
    }

    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: u32, color: Rgb<u8>) {
        let mut cx = x;
        let adv = ADVANCE * scale as i32;
        for ch in text.chars() {
            self.draw_char(cx, y, ch, scale, color);
            cx += adv;
        }
    }

    /// Text rotated a quarter turn counter-clockwise, read bottom to top.
    /// `(x, y)` is the bottom-left corner of the first glyph.
    pub fn draw_text_vertical(&mut self, x: i32, y: i32, text: &str, scale: u32, color: Rgb<u8>) {
        let s = scale as i32;
        let mut cy = y;
        for ch in text.chars() {
            for (row, line) in glyph(ch).iter().enumerate() {
                for (col, c) in line.chars().enumerate() {
                    if c != '#' {
                        continue;
                    }
                    let px0 = x + row as i32 * s;
                    let py0 = cy - (col as i32 + 1) * s;
                    for sy in 0..s {
                        for sx in 0..s {
                            self.put(px0 + sx, py0 + sy, color);
                        }
                    }
                }
            }
            cy -= ADVANCE * s;
        }
    }

    pub fn save_png(&self, path: &Path) -> ImageResult<()> {
        save_png(&self.img, path)
    }
}

/// Write an 8-bit RGB PNG with maximum compression.
pub fn save_png(img: &RgbImage, path: &Path) -> ImageResult<()> {
    let file = BufWriter::new(File::create(path)?);
    let encoder = PngEncoder::new_with_quality(file, CompressionType::Best, FilterType::Adaptive);
    encoder.write_image(img.as_raw(), img.width(), img.height(), ColorType::Rgb8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngDecoder;
    use image::ImageDecoder;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    fn lit(c: &Canvas) -> usize {
        c.image().pixels().filter(|p| p.0 != [0, 0, 0]).count()
    }

    #[test]
    fn line_and_rect() {
        let mut c = Canvas::new(10, 10, BLACK);
        c.draw_line(0, 0, 9, 9, RED);
        assert_eq!(c.image().get_pixel(0, 0), &RED);
        assert_eq!(c.image().get_pixel(9, 9), &RED);
        c.fill_rect(Rect::new(2, 2, 3, 3), Rgb([0, 255, 0]));
        for y in 2..5 {
            for x in 2..5 {
                assert_eq!(c.image().get_pixel(x, y), &Rgb([0, 255, 0]));
            }
        }
    }

    #[test]
    fn dashed_lines_leave_gaps() {
        let mut solid = Canvas::new(100, 1, BLACK);
        solid.draw_polyline(&[(0, 0), (99, 0)], &Stroke::solid(RED, 1));
        let mut dashed = Canvas::new(100, 1, BLACK);
        dashed.draw_polyline(
            &[(0, 0), (99, 0)],
            &Stroke {
                color: RED,
                width: 1,
                style: LineStyle::Dashed,
            },
        );
        assert_eq!(lit(&solid), 100);
        assert!(lit(&dashed) > 30 && lit(&dashed) < 100);
    }

    #[test]
    fn clip_restricts_drawing() {
        let mut c = Canvas::new(10, 10, BLACK);
        c.set_clip(Some(Rect::new(0, 0, 5, 10)));
        c.draw_line(0, 5, 9, 5, RED);
        assert_eq!(lit(&c), 5);
        c.set_clip(None);
        c.draw_line(0, 6, 9, 6, RED);
        assert_eq!(lit(&c), 15);
    }

    #[test]
    fn scaled_text_renders_larger() {
        let mut small = Canvas::new(20, 20, BLACK);
        small.draw_text(0, 0, "1", 1, RED);
        let mut large = Canvas::new(40, 40, BLACK);
        large.draw_text(0, 0, "1", 2, RED);
        assert_eq!(lit(&large), lit(&small) * 4);
    }

    #[test]
    fn vertical_text_uses_the_same_pixels() {
        let mut flat = Canvas::new(20, 20, BLACK);
        flat.draw_text(0, 0, "L", 1, RED);
        let mut upright = Canvas::new(20, 20, BLACK);
        upright.draw_text_vertical(0, 10, "L", 1, RED);
        assert_eq!(lit(&flat), lit(&upright));
    }

    #[test]
    fn markers_draw_around_centre() {
        let mut c = Canvas::new(11, 11, BLACK);
        c.draw_marker(5, 5, Marker::Circle, 2, RED);
        assert_eq!(c.image().get_pixel(5, 5), &RED);
        assert_eq!(c.image().get_pixel(0, 0), &BLACK);
        let mut x = Canvas::new(11, 11, BLACK);
        x.draw_marker(5, 5, Marker::Cross, 3, RED);
        assert_eq!(x.image().get_pixel(2, 2), &RED);
        assert_eq!(x.image().get_pixel(8, 2), &RED);
    }

    #[test]
    fn saves_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let c = Canvas::new(3, 2, RED);
        c.save_png(&path).unwrap();
        let dec = PngDecoder::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(dec.color_type(), ColorType::Rgb8);
        assert_eq!(dec.dimensions(), (3, 2));
    }
}
