//! Angle arithmetic shared by arcs and circles.
//!
//! All angles are radians measured with `atan2(dy, dx)` in tile coordinates
//! (y grows downward), so "counter-clockwise" here means increasing angle.

use kurbo::{Point, Vec2};
use std::f64::consts::TAU;

/// Slack used when comparing an angle against an arc span.
pub const ANGLE_EPS: f64 = 1e-9;

/// Wrap an angle into `[0, TAU)`.
pub fn angle_wrap(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Angular distance travelled going counter-clockwise from `a0` to `a1`, in `[0, TAU)`.
pub fn angle_delta_ccw(a0: f64, a1: f64) -> f64 {
    let d = angle_wrap(a1) - angle_wrap(a0);
    if d < 0.0 { d + TAU } else { d }
}

/// Angular distance travelled going clockwise from `a0` to `a1`.
pub fn angle_delta_cw(a0: f64, a1: f64) -> f64 {
    angle_delta_ccw(a1, a0)
}

/// Check whether `angle` lies on the counter-clockwise span from `a0` to `a1` (inclusive).
pub fn angle_in_arc(angle: f64, a0: f64, a1: f64) -> bool {
    let a = angle_wrap(angle);
    let s = angle_wrap(a0);
    let e = angle_wrap(a1);
    if s <= e {
        a >= s - ANGLE_EPS && a <= e + ANGLE_EPS
    } else {
        a >= s - ANGLE_EPS || a <= e + ANGLE_EPS
    }
}

/// Point at `angle` on the circle of radius `r` around `c`.
pub fn point_on_circle(c: Point, r: f64, angle: f64) -> Point {
    c + Vec2::from_angle(angle) * r
}

/// Wrapped angle of `p` as seen from `c`.
pub fn angle_of(c: Point, p: Point) -> f64 {
    angle_wrap((p - c).atan2())
}

/// Unit tangent of travel at `angle` when walking a circle counter-clockwise.
pub fn ccw_tangent(angle: f64) -> Vec2 {
    Vec2::new(-angle.sin(), angle.cos())
}

/// Sort, wrap and dedupe a list of angles; a trailing value that wraps onto
/// the first one is dropped.
pub fn normalize_angle_list(angles: &[f64]) -> Vec<f64> {
    let mut vals: Vec<f64> = angles.iter().map(|&a| angle_wrap(a)).collect();
    vals.sort_by(f64::total_cmp);
    let mut out: Vec<f64> = Vec::with_capacity(vals.len());
    for a in vals {
        match out.last() {
            Some(&last) if (a - last).abs() <= 1e-6 => {}
            _ => out.push(a),
        }
    }
    if out.len() > 1 {
        if let (Some(&first), Some(&last)) = (out.first(), out.last()) {
            if (first + TAU - last).abs() < 1e-6 {
                out.pop();
            }
        }
    }
    out
}
