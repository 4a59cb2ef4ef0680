//! Splitting boundary primitives into sub-edges and orienting them against
//! the fill mask.

use crate::geometry::{
    Primitive, angle_delta_ccw, angle_in_arc, angle_wrap, ccw_tangent, normalize_angle_list,
    point_on_circle, primitive_intersections,
};
use kurbo::{Point, Vec2};
use std::f64::consts::{PI, TAU};

/// Split parameters closer than this are merged.
const PARAM_EPS: f64 = 1e-6;

/// A piece of a boundary primitive between two consecutive split parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubEdge {
    Line { p0: Point, p1: Point },
    /// Runs counter-clockwise from `a0` to `a1`; `a1` may exceed `TAU`.
    Arc { c: Point, r: f64, a0: f64, a1: f64 },
}

/// Geometry of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeShape {
    Line,
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        /// Travel direction is increasing angle.
        ccw: bool,
    },
}

/// A sub-edge oriented so the fill interior lies on its left normal
/// `(-dir.y, dir.x)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectedEdge {
    pub shape: EdgeShape,
    pub start: Point,
    pub end: Point,
    /// Unit tangent of travel at `start`.
    pub start_dir: Vec2,
    /// Unit tangent of travel at `end`.
    pub end_dir: Vec2,
}

impl DirectedEdge {
    /// Angle swept by an arc edge in its travel direction.
    pub fn sweep(&self) -> f64 {
        match self.shape {
            EdgeShape::Line => 0.0,
            EdgeShape::Arc {
                start_angle,
                end_angle,
                ccw,
                ..
            } => {
                if ccw {
                    angle_delta_ccw(start_angle, end_angle)
                } else {
                    angle_delta_ccw(end_angle, start_angle)
                }
            }
        }
    }
}

/// Which side of a sub-edge the fill lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

fn push_unique(values: &mut Vec<f64>, value: f64) {
    if values.iter().all(|v| (v - value).abs() > PARAM_EPS) {
        values.push(value);
    }
}

fn unit_or_x(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > 1e-12 { v / len } else { Vec2::new(1.0, 0.0) }
}

/// Split parameters for every primitive: domain endpoints plus the parameter
/// of every pairwise intersection.
pub fn split_parameters(primitives: &[Primitive]) -> Vec<Vec<f64>> {
    let mut splits: Vec<Vec<f64>> = primitives
        .iter()
        .map(|p| {
            let mut values = Vec::new();
            match *p {
                Primitive::Line { .. } => {
                    push_unique(&mut values, 0.0);
                    push_unique(&mut values, 1.0);
                }
                Primitive::Arc { a0, a1, .. } => {
                    push_unique(&mut values, angle_wrap(a0));
                    push_unique(&mut values, angle_wrap(a1));
                }
                Primitive::Circle { .. } => {}
            }
            values
        })
        .collect();

    for i in 0..primitives.len() {
        for j in (i + 1)..primitives.len() {
            for p in primitive_intersections(&primitives[i], &primitives[j]) {
                let ti = primitives[i].param_at(p);
                let tj = primitives[j].param_at(p);
                push_unique(&mut splits[i], ti);
                push_unique(&mut splits[j], tj);
            }
        }
    }
    splits
}

/// Cut each primitive at its split parameters.
pub fn slice(primitives: &[Primitive], splits: &[Vec<f64>]) -> Vec<SubEdge> {
    let mut out = Vec::new();
    for (primitive, params) in primitives.iter().zip(splits) {
        match *primitive {
            Primitive::Line { a, b } => slice_line(a, b, params, &mut out),
            Primitive::Arc { c, r, a0, a1 } => slice_arc(c, r, a0, a1, params, &mut out),
            Primitive::Circle { c, r } => slice_circle(c, r, params, &mut out),
        }
    }
    out
}

fn slice_line(a: Point, b: Point, params: &[f64], out: &mut Vec<SubEdge>) {
    let mut ts = params.to_vec();
    ts.sort_by(f64::total_cmp);
    ts.dedup_by(|t, prev| (*t - *prev).abs() <= PARAM_EPS);
    let (Some(&first), Some(&last)) = (ts.first(), ts.last()) else {
        return;
    };
    if first.abs() > PARAM_EPS {
        ts.insert(0, 0.0);
    }
    if (last - 1.0).abs() > PARAM_EPS {
        ts.push(1.0);
    }
    for pair in ts.windows(2) {
        let t0 = pair[0].clamp(0.0, 1.0);
        let t1 = pair[1].clamp(0.0, 1.0);
        if t1 - t0 <= PARAM_EPS {
            continue;
        }
        out.push(SubEdge::Line {
            p0: a.lerp(b, t0),
            p1: a.lerp(b, t1),
        });
    }
}

fn slice_arc(c: Point, r: f64, a0: f64, a1: f64, params: &[f64], out: &mut Vec<SubEdge>) {
    let s = angle_wrap(a0);
    let e = angle_wrap(a1);
    if angle_delta_ccw(s, e) <= PARAM_EPS {
        return;
    }
    let mut inner: Vec<f64> = params.iter().copied().filter(|a| angle_in_arc(*a, s, e)).collect();
    inner.extend([s, e]);
    let mut vals = normalize_angle_list(&inner);
    vals.sort_by(|u, v| angle_delta_ccw(s, *u).total_cmp(&angle_delta_ccw(s, *v)));
    for pair in vals.windows(2) {
        if angle_delta_ccw(pair[0], pair[1]) <= PARAM_EPS {
            continue;
        }
        out.push(SubEdge::Arc {
            c,
            r,
            a0: pair[0],
            a1: pair[1],
        });
    }
}

fn slice_circle(c: Point, r: f64, params: &[f64], out: &mut Vec<SubEdge>) {
    let vals = normalize_angle_list(params);
    let vals = match vals.as_slice() {
        [] => vec![0.0, PI],
        [only] => normalize_angle_list(&[*only, *only + PI]),
        _ => vals,
    };
    if vals.len() < 2 {
        return;
    }
    for (k, &a0) in vals.iter().enumerate() {
        let a1 = match vals.get(k + 1) {
            Some(&next) => next,
            None => vals[0] + TAU,
        };
        if a1 - a0 <= PARAM_EPS {
            continue;
        }
        out.push(SubEdge::Arc { c, r, a0, a1 });
    }
}

/// Probe both sides of `mid` at growing offsets until exactly one side is
/// inside the fill.
pub fn inside_side(
    mid: Point,
    normal_left: Vec2,
    sample_base: f64,
    multipliers: &[f64],
    inside: &impl Fn(Point) -> bool,
) -> Option<Side> {
    multipliers.iter().find_map(|m| {
        let d = sample_base * m;
        let left = inside(mid + normal_left * d);
        let right = inside(mid - normal_left * d);
        match (left, right) {
            (true, false) => Some(Side::Left),
            (false, true) => Some(Side::Right),
            _ => None,
        }
    })
}

/// Orient a sub-edge so the fill interior is on its left. Sub-edges whose
/// side cannot be decided are dropped.
pub fn orient(
    edge: &SubEdge,
    sample_base: f64,
    multipliers: &[f64],
    inside: &impl Fn(Point) -> bool,
) -> Option<DirectedEdge> {
    match *edge {
        SubEdge::Line { p0, p1 } => {
            if (p1 - p0).hypot() <= PARAM_EPS {
                return None;
            }
            let dir = unit_or_x(p1 - p0);
            let mid = p0.midpoint(p1);
            let side = inside_side(mid, Vec2::new(-dir.y, dir.x), sample_base, multipliers, inside)?;
            let (start, end) = match side {
                Side::Left => (p0, p1),
                Side::Right => (p1, p0),
            };
            let dir = unit_or_x(end - start);
            Some(DirectedEdge {
                shape: EdgeShape::Line,
                start,
                end,
                start_dir: dir,
                end_dir: dir,
            })
        }
        SubEdge::Arc { c, r, a0, a1 } => {
            let delta = angle_delta_ccw(a0, a1);
            if delta <= PARAM_EPS {
                return None;
            }
            let mid_angle = a0 + delta * 0.5;
            let tangent = ccw_tangent(mid_angle);
            let normal_left = Vec2::new(-tangent.y, tangent.x);
            let side = inside_side(point_on_circle(c, r, mid_angle), normal_left, sample_base, multipliers, inside)?;
            let (ccw, a_start, a_end) = match side {
                Side::Left => (true, a0, a1),
                Side::Right => (false, a1, a0),
            };
            let sign = if ccw { 1.0 } else { -1.0 };
            Some(DirectedEdge {
                shape: EdgeShape::Arc {
                    center: c,
                    radius: r,
                    start_angle: a_start,
                    end_angle: a_end,
                    ccw,
                },
                start: point_on_circle(c, r, a_start),
                end: point_on_circle(c, r, a_end),
                start_dir: unit_or_x(ccw_tangent(a_start) * sign),
                end_dir: unit_or_x(ccw_tangent(a_end) * sign),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_crossing_lines_split_in_half() {
        let prims = [
            Primitive::line(Point::new(-10.0, 0.0), Point::new(10.0, 0.0)),
            Primitive::line(Point::new(0.0, -10.0), Point::new(0.0, 10.0)),
        ];
        let splits = split_parameters(&prims);
        assert_eq!(splits[0].len(), 3);
        let edges = slice(&prims, &splits);
        assert_eq!(edges.len(), 4);
    }

    #[test]
    fn test_lone_circle_gets_two_halves() {
        let prims = [Primitive::circle(Point::ZERO, 5.0)];
        let edges = slice(&prims, &split_parameters(&prims));
        assert_eq!(edges.len(), 2);
        match edges[1] {
            SubEdge::Arc { a0, a1, .. } => {
                assert!((a0 - PI).abs() < 1e-12);
                assert!((a1 - TAU).abs() < 1e-12);
            }
            _ => panic!("expected arc"),
        }
    }

    #[test]
    fn test_circle_with_one_split_gets_antipode() {
        let prims = [Primitive::circle(Point::ZERO, 5.0)];
        let edges = slice(&prims, &[vec![FRAC_PI_2]]);
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| matches!(e, SubEdge::Arc { a0, a1, .. } if (angle_delta_ccw(*a0, *a1) - PI).abs() < 1e-9)));
    }

    #[test]
    fn test_arc_split_across_zero() {
        let prims = [Primitive::arc(Point::ZERO, 5.0, 3.0 * FRAC_PI_2, FRAC_PI_2)];
        let edges = slice(&prims, &[vec![3.0 * FRAC_PI_2, FRAC_PI_2, 0.0, PI]]);
        // PI lies outside the span and is ignored.
        assert_eq!(edges.len(), 2);
        match edges[0] {
            SubEdge::Arc { a0, a1, .. } => {
                assert!((a0 - 3.0 * FRAC_PI_2).abs() < 1e-12);
                assert!(a1.abs() < 1e-12);
            }
            _ => panic!("expected arc"),
        }
    }

    #[test]
    fn test_orient_line_puts_inside_on_left() {
        // Interior is y > 0; the left normal of +x travel is +y.
        let inside = |p: Point| p.y > 0.0;
        let edge = SubEdge::Line {
            p0: Point::new(0.0, 0.0),
            p1: Point::new(10.0, 0.0),
        };
        let d = orient(&edge, 0.5, &[1.0, 2.0, 4.0], &inside).unwrap();
        assert_eq!((d.start, d.end), (Point::new(0.0, 0.0), Point::new(10.0, 0.0)));

        let flipped = |p: Point| p.y < 0.0;
        let d = orient(&edge, 0.5, &[1.0, 2.0, 4.0], &flipped).unwrap();
        assert_eq!(d.start, Point::new(10.0, 0.0));
        assert_eq!(d.start_dir, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_orient_arc_direction() {
        let edge = SubEdge::Arc {
            c: Point::ZERO,
            r: 10.0,
            a0: 0.0,
            a1: FRAC_PI_2,
        };
        let inside_disk = |p: Point| p.to_vec2().hypot() < 10.0;
        let d = orient(&edge, 0.5, &[1.0], &inside_disk).unwrap();
        assert!(matches!(d.shape, EdgeShape::Arc { ccw: true, .. }));
        assert!((d.sweep() - FRAC_PI_2).abs() < 1e-12);

        let outside_disk = |p: Point| p.to_vec2().hypot() > 10.0;
        let d = orient(&edge, 0.5, &[1.0], &outside_disk).unwrap();
        assert!(matches!(d.shape, EdgeShape::Arc { ccw: false, .. }));
        assert!((d.start - Point::new(0.0, 10.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_undecided_edge_is_dropped() {
        let edge = SubEdge::Line {
            p0: Point::ZERO,
            p1: Point::new(1.0, 0.0),
        };
        assert!(orient(&edge, 0.5, &[1.0, 2.0], &|_| true).is_none());
        assert!(orient(&edge, 0.5, &[1.0, 2.0], &|_| false).is_none());
    }
}
