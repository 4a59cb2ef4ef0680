//! Wall rasters painted with tiny-skia.
//!
//! Two rasters are painted over the same [`RasterGrid`]: an anti-aliased
//! black-on-white wall raster that decides where a flood fill may go, and a
//! coded raster where every stroke is painted in a colour encoding its code so
//! a fill can tell which strokes it ran into.

use super::{FillError, FillResult};
use crate::config::FillConfig;
use crate::geometry::Primitive;
use crate::ink::InkId;
use kurbo::{BezPath, PathEl, Point, Rect, Size};
use tiny_skia::{Color, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

/// Code painted for the tile outline on the coded raster.
pub const TILE_EDGE_CODE: u32 = 1;
/// Ink `k` is painted with code `k + INK_CODE_OFFSET`.
pub const INK_CODE_OFFSET: u32 = 2;

/// Flattening tolerance for curves, in raster pixels.
const CURVE_TOLERANCE: f64 = 0.05;

pub fn code_for_ink(id: InkId) -> u32 {
    id.saturating_add(INK_CODE_OFFSET)
}

pub fn ink_for_code(code: u32) -> Option<InkId> {
    code.checked_sub(INK_CODE_OFFSET)
}

/// Mapping from a local-space rectangle onto a pixel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterGrid {
    /// Local coordinates of the top-left raster corner.
    pub origin: Point,
    /// Pixels per local unit.
    pub scale: f64,
    pub width: u32,
    pub height: u32,
}

impl RasterGrid {
    /// Grid covering `bounds` grown by `margin`, scaled so its longest side
    /// approaches `target_px` within the configured clamp.
    pub fn fit(bounds: Rect, margin: f64, target_px: f64, config: &FillConfig) -> Self {
        let bounds = bounds.inflate(margin, margin);
        let w_local = bounds.width().max(1.0);
        let h_local = bounds.height().max(1.0);
        let scale = config.raster_scale(w_local, h_local, target_px);
        Self {
            origin: Point::new(bounds.x0, bounds.y0),
            scale,
            width: ((w_local * scale).ceil() as u32).max(1),
            height: ((h_local * scale).ceil() as u32).max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Local point to raster pixel coordinates (not rounded).
    pub fn to_pixels(&self, p: Point) -> Point {
        ((p - self.origin) * self.scale).to_point()
    }

    /// Pixel containing a local point, if it falls on the raster.
    pub fn pixel_at(&self, p: Point) -> Option<(u32, u32)> {
        let q = self.to_pixels(p);
        let (x, y) = (q.x.floor(), q.y.floor());
        if x < 0.0 || y < 0.0 || x >= self.width as f64 || y >= self.height as f64 {
            return None;
        }
        Some((x as u32, y as u32))
    }

    /// Local coordinates of a pixel's top-left corner.
    pub fn pixel_corner(&self, x: u32, y: u32) -> Point {
        self.origin + kurbo::Vec2::new(x as f64, y as f64) / self.scale
    }

    /// Local extent actually covered by the pixels.
    pub fn extent(&self) -> Size {
        Size::new(self.width as f64 / self.scale, self.height as f64 / self.scale)
    }

    fn pixmap(&self) -> FillResult<Pixmap> {
        Pixmap::new(self.width, self.height).ok_or(FillError::RasterAllocation {
            width: self.width,
            height: self.height,
        })
    }

    fn outline_path(&self, polygon: &[Point]) -> Option<Path> {
        let mut pb = PathBuilder::new();
        for (i, p) in polygon.iter().enumerate() {
            let q = self.to_pixels(*p);
            if i == 0 {
                pb.move_to(q.x as f32, q.y as f32);
            } else {
                pb.line_to(q.x as f32, q.y as f32);
            }
        }
        pb.close();
        pb.finish()
    }

    fn primitive_path(&self, primitive: &Primitive) -> Option<Path> {
        let local = primitive.to_pixels(self.origin, self.scale);
        bez_to_skia(&local.to_path(CURVE_TOLERANCE))
    }
}

/// Convert a kurbo path into a tiny-skia path without any transform.
pub fn bez_to_skia(path: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(a, p) => pb.quad_to(a.x as f32, a.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(a, b, p) => pb.cubic_to(
                a.x as f32, a.y as f32, b.x as f32, b.y as f32, p.x as f32, p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

fn code_color(code: u32) -> (u8, u8, u8) {
    ((code & 255) as u8, ((code >> 8) & 255) as u8, ((code >> 16) & 255) as u8)
}

/// Anti-aliased wall raster: `true` where a painted stroke pulls any channel
/// below the wall threshold.
pub fn paint_walls(
    grid: &RasterGrid,
    outline: Option<&[Point]>,
    strokes: &[Primitive],
    config: &FillConfig,
) -> FillResult<Vec<bool>> {
    let mut pixmap = grid.pixmap()?;
    pixmap.fill(Color::WHITE);

    let mut paint = Paint::default();
    paint.set_color_rgba8(0, 0, 0, 255);
    paint.anti_alias = true;
    let stroke = round_stroke(config.stroke_width_px);

    if let Some(path) = outline.and_then(|poly| grid.outline_path(poly)) {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
    for primitive in strokes.iter().filter(|p| !p.is_degenerate()) {
        if let Some(path) = grid.primitive_path(primitive) {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    let threshold = config.wall_threshold;
    Ok(pixmap
        .data()
        .chunks_exact(4)
        .map(|px| px[0] < threshold || px[1] < threshold || px[2] < threshold)
        .collect())
}

/// Coded raster: each pixel holds the code of the last stroke painted over it,
/// or 0. Painted aliased and wider than the wall raster so that every wall
/// pixel carries a code.
pub fn paint_codes(
    grid: &RasterGrid,
    outline: Option<&[Point]>,
    strokes: &[(u32, Primitive)],
    config: &FillConfig,
) -> FillResult<Vec<u32>> {
    let mut pixmap = grid.pixmap()?;
    pixmap.fill(Color::BLACK);

    let mut paint = Paint::default();
    paint.anti_alias = false;
    let stroke = round_stroke(config.stroke_width_px + config.code_stroke_pad_px);

    if let Some(path) = outline.and_then(|poly| grid.outline_path(poly)) {
        let (r, g, b) = code_color(TILE_EDGE_CODE);
        paint.set_color_rgba8(r, g, b, 255);
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
    for (code, primitive) in strokes.iter().filter(|(_, p)| !p.is_degenerate()) {
        if let Some(path) = grid.primitive_path(primitive) {
            let (r, g, b) = code_color(*code);
            paint.set_color_rgba8(r, g, b, 255);
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    Ok(pixmap
        .data()
        .chunks_exact(4)
        .map(|px| px[0] as u32 | (px[1] as u32) << 8 | (px[2] as u32) << 16)
        .collect())
}
