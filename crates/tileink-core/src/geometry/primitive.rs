//! Stroke primitive geometry.

use super::angle::{angle_delta_ccw, angle_in_arc, angle_of, angle_wrap};
use kurbo::{Arc as KurboArc, BezPath, Circle as KurboCircle, Line as KurboLine, Point, Rect, Shape as _, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Below this length/radius a primitive is treated as degenerate.
pub const DEGENERATE_EPS: f64 = 1e-6;

/// Distance tolerance for "point lies on primitive" tests.
pub const ON_PRIMITIVE_EPS: f64 = 1e-4;

/// A stroke in some coordinate space (world or tile-local).
///
/// Arcs run counter-clockwise (increasing angle) from `a0` to `a1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
    Line { a: Point, b: Point },
    Circle { c: Point, r: f64 },
    Arc { c: Point, r: f64, a0: f64, a1: f64 },
}

impl Primitive {
    pub fn line(a: Point, b: Point) -> Self {
        Primitive::Line { a, b }
    }

    pub fn circle(c: Point, r: f64) -> Self {
        Primitive::Circle { c, r }
    }

    pub fn arc(c: Point, r: f64, a0: f64, a1: f64) -> Self {
        Primitive::Arc { c, r, a0, a1 }
    }

    /// An arc sweeping a full turn or more draws a whole circle and is
    /// stored as one. Other primitives are returned unchanged.
    pub fn normalized(self) -> Self {
        match self {
            Primitive::Arc { c, r, a0, a1 } if a1 - a0 >= TAU - DEGENERATE_EPS => Primitive::Circle { c, r },
            other => other,
        }
    }

    /// Zero-length lines and non-positive radii never take part in a fill.
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Primitive::Line { a, b } => (b - a).hypot() <= DEGENERATE_EPS,
            Primitive::Circle { r, .. } => r.is_nan() || r <= DEGENERATE_EPS,
            Primitive::Arc { r, a0, a1, .. } => {
                r.is_nan() || r <= DEGENERATE_EPS || angle_delta_ccw(a0, a1) <= DEGENERATE_EPS
            }
        }
    }

    /// Uniformly scale about the origin. Arc angles are scale invariant.
    pub fn scaled(&self, factor: f64) -> Self {
        match *self {
            Primitive::Line { a, b } => Primitive::Line {
                a: (a.to_vec2() * factor).to_point(),
                b: (b.to_vec2() * factor).to_point(),
            },
            Primitive::Circle { c, r } => Primitive::Circle {
                c: (c.to_vec2() * factor).to_point(),
                r: r * factor,
            },
            Primitive::Arc { c, r, a0, a1 } => Primitive::Arc {
                c: (c.to_vec2() * factor).to_point(),
                r: r * factor,
                a0,
                a1,
            },
        }
    }

    /// Translate then scale: `(p - origin) * factor`. Used to map local
    /// coordinates into raster pixels.
    pub fn to_pixels(&self, origin: Point, factor: f64) -> Self {
        let map = |p: Point| ((p - origin) * factor).to_point();
        match *self {
            Primitive::Line { a, b } => Primitive::Line { a: map(a), b: map(b) },
            Primitive::Circle { c, r } => Primitive::Circle { c: map(c), r: r * factor },
            Primitive::Arc { c, r, a0, a1 } => Primitive::Arc { c: map(c), r: r * factor, a0, a1 },
        }
    }

    /// Conservative bounding box (arcs use their full circle).
    pub fn bounds(&self) -> Rect {
        match *self {
            Primitive::Line { a, b } => Rect::from_points(a, b),
            Primitive::Circle { c, r } | Primitive::Arc { c, r, .. } => {
                Rect::new(c.x - r, c.y - r, c.x + r, c.y + r)
            }
        }
    }

    /// Parameter of a point assumed to lie on the primitive: a segment fraction
    /// for lines, a wrapped angle for circles and arcs.
    pub fn param_at(&self, p: Point) -> f64 {
        match *self {
            Primitive::Line { a, b } => line_param_at(a, b, p),
            Primitive::Circle { c, .. } | Primitive::Arc { c, .. } => angle_of(c, p),
        }
    }

    /// Check whether `p` lies on the primitive within [`ON_PRIMITIVE_EPS`].
    pub fn contains_point(&self, p: Point) -> bool {
        match *self {
            Primitive::Line { a, b } => {
                let t = line_param_at(a, b, p);
                point_to_segment_dist(p, a, b) <= ON_PRIMITIVE_EPS && (-1e-6..=1.0 + 1e-6).contains(&t)
            }
            Primitive::Circle { c, r } => ((p - c).hypot() - r).abs() <= ON_PRIMITIVE_EPS,
            Primitive::Arc { c, r, a0, a1 } => {
                ((p - c).hypot() - r).abs() <= ON_PRIMITIVE_EPS && angle_in_arc(angle_of(c, p), a0, a1)
            }
        }
    }

    /// Distance from `p` to the stroke's centerline.
    pub fn distance_to(&self, p: Point) -> f64 {
        match *self {
            Primitive::Line { a, b } => point_to_segment_dist(p, a, b),
            Primitive::Circle { c, r } => ((p - c).hypot() - r).abs(),
            Primitive::Arc { c, r, a0, a1 } => {
                if angle_in_arc(angle_of(c, p), a0, a1) {
                    ((p - c).hypot() - r).abs()
                } else {
                    let e0 = super::angle::point_on_circle(c, r, a0);
                    let e1 = super::angle::point_on_circle(c, r, a1);
                    (p - e0).hypot().min((p - e1).hypot())
                }
            }
        }
    }

    /// Bezier outline of the stroke's centerline.
    pub fn to_path(&self, tolerance: f64) -> BezPath {
        match *self {
            Primitive::Line { a, b } => KurboLine::new(a, b).to_path(tolerance),
            Primitive::Circle { c, r } => KurboCircle::new(c, r).to_path(tolerance),
            Primitive::Arc { c, r, a0, a1 } => {
                let arc = KurboArc::new(c, Vec2::new(r, r), angle_wrap(a0), angle_delta_ccw(a0, a1), 0.0);
                arc.to_path(tolerance)
            }
        }
    }
}

/// Fraction of `p` along `a → b`, measured on the dominant axis.
pub fn line_param_at(a: Point, b: Point, p: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx.abs() >= dy.abs() {
        if dx != 0.0 { (p.x - a.x) / dx } else { 0.0 }
    } else {
        (p.y - a.y) / dy
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}
