//! Pairwise intersections between stroke primitives.

use super::primitive::Primitive;
use kurbo::Point;

/// Points closer than this are considered the same intersection.
pub const DEDUPE_EPS: f64 = 1e-6;

/// Slack on the segment parameter range `[0, 1]`.
const SEGMENT_PARAM_EPS: f64 = 1e-7;

/// Intersect two primitives, keeping only points that lie on both of them.
pub fn primitive_intersections(a: &Primitive, b: &Primitive) -> Vec<Point> {
    let pts = match (*a, *b) {
        (Primitive::Line { a: a0, b: a1 }, Primitive::Line { a: b0, b: b1 }) => {
            segment_intersection(a0, a1, b0, b1).into_iter().collect()
        }
        (Primitive::Line { a: p0, b: p1 }, Primitive::Circle { c, r } | Primitive::Arc { c, r, .. })
        | (Primitive::Circle { c, r } | Primitive::Arc { c, r, .. }, Primitive::Line { a: p0, b: p1 }) => {
            segment_circle_intersections(p0, p1, c, r)
        }
        (
            Primitive::Circle { c: c0, r: r0 } | Primitive::Arc { c: c0, r: r0, .. },
            Primitive::Circle { c: c1, r: r1 } | Primitive::Arc { c: c1, r: r1, .. },
        ) => circle_circle_intersections(c0, r0, c1, r1),
    };
    dedupe_points(pts, DEDUPE_EPS)
        .into_iter()
        .filter(|p| a.contains_point(*p) && b.contains_point(*p))
        .collect()
}

/// Intersection of segments `a0→a1` and `b0→b1` via the 2D determinant.
/// Parallel segments never intersect.
pub fn segment_intersection(a0: Point, a1: Point, b0: Point, b1: Point) -> Option<Point> {
    let r = a1 - a0;
    let s = b1 - b0;
    let den = r.cross(s);
    if den.abs() < 1e-9 {
        return None;
    }
    let qp = b0 - a0;
    let t = qp.cross(s) / den;
    let u = qp.cross(r) / den;
    let range = -SEGMENT_PARAM_EPS..=1.0 + SEGMENT_PARAM_EPS;
    if !range.contains(&t) || !range.contains(&u) {
        return None;
    }
    Some(a0 + r * t)
}

/// Intersections of segment `a→b` with the circle `(c, r)` by substituting the
/// segment's parametric form into the circle equation.
pub fn segment_circle_intersections(a: Point, b: Point, c: Point, r: f64) -> Vec<Point> {
    let d = b - a;
    let f = a - c;
    let qa = d.dot(d);
    if qa < 1e-10 {
        return Vec::new();
    }
    let qb = 2.0 * f.dot(d);
    let qc = f.dot(f) - r * r;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < -1e-8 {
        return Vec::new();
    }
    let disc = disc.max(0.0);
    let ts: Vec<f64> = if disc <= 1e-8 {
        vec![-qb / (2.0 * qa)]
    } else {
        let root = disc.sqrt();
        vec![(-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa)]
    };
    let range = -SEGMENT_PARAM_EPS..=1.0 + SEGMENT_PARAM_EPS;
    let pts = ts
        .into_iter()
        .filter(|t| range.contains(t))
        .map(|t| a + d * t)
        .collect();
    dedupe_points(pts, DEDUPE_EPS)
}

/// Intersections of two circles through their radical line.
/// Concentric circles yield nothing; tangent circles yield one point.
pub fn circle_circle_intersections(c0: Point, r0: f64, c1: Point, r1: f64) -> Vec<Point> {
    let dv = c1 - c0;
    let d = dv.hypot();
    if d < 1e-8 || d > r0 + r1 + 1e-8 || d < (r0 - r1).abs() - 1e-8 {
        return Vec::new();
    }
    let a = (r0 * r0 - r1 * r1 + d * d) / (2.0 * d);
    let h2 = r0 * r0 - a * a;
    if h2 < -1e-8 {
        return Vec::new();
    }
    let h = h2.max(0.0).sqrt();
    let m = c0 + dv * (a / d);
    let rx = -dv.y * h / d;
    let ry = dv.x * h / d;
    let first = Point::new(m.x + rx, m.y + ry);
    if h <= 1e-8 {
        return vec![first];
    }
    vec![first, Point::new(m.x - rx, m.y - ry)]
}

/// Drop points within `eps` of an earlier point, keeping first occurrences.
pub fn dedupe_points(points: Vec<Point>, eps: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.iter().all(|q| (p - *q).hypot() > eps) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_line_line_cross() {
        let a = Primitive::line(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        let b = Primitive::line(Point::new(0.0, 2.0), Point::new(2.0, 0.0));
        let pts = primitive_intersections(&a, &b);
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - Point::new(1.0, 1.0)).hypot() < 1e-12);
    }

    #[test]
    fn test_line_line_parallel_and_disjoint() {
        let a = Primitive::line(Point::new(0.0, 0.0), Point::new(2.0, 0.0));
        let b = Primitive::line(Point::new(0.0, 1.0), Point::new(2.0, 1.0));
        assert!(primitive_intersections(&a, &b).is_empty());
        let c = Primitive::line(Point::new(3.0, -1.0), Point::new(3.0, 1.0));
        assert!(primitive_intersections(&a, &c).is_empty());
    }

    #[test]
    fn test_line_touching_endpoint() {
        let a = Primitive::line(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        let b = Primitive::line(Point::new(1.0, 0.0), Point::new(1.0, 1.0));
        let pts = primitive_intersections(&a, &b);
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - Point::new(1.0, 0.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_line_circle_secant_and_tangent() {
        let circle = Primitive::circle(Point::ZERO, 5.0);
        let secant = Primitive::line(Point::new(-10.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(primitive_intersections(&secant, &circle).len(), 2);
        let tangent = Primitive::line(Point::new(-10.0, 5.0), Point::new(10.0, 5.0));
        let pts = primitive_intersections(&circle, &tangent);
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - Point::new(0.0, 5.0)).hypot() < 1e-6);
        let short = Primitive::line(Point::new(-1.0, 0.0), Point::new(1.0, 0.0));
        assert!(primitive_intersections(&short, &circle).is_empty());
    }

    #[test]
    fn test_line_arc_filters_by_span() {
        // Arc covering the lower half in y-down coordinates (angles 0..PI).
        let arc = Primitive::arc(Point::ZERO, 5.0, 0.0, PI);
        let vertical = Primitive::line(Point::new(0.0, -10.0), Point::new(0.0, 10.0));
        let pts = primitive_intersections(&vertical, &arc);
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - Point::new(0.0, 5.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_circle_circle() {
        let a = Primitive::circle(Point::new(0.0, 0.0), 5.0);
        let b = Primitive::circle(Point::new(8.0, 0.0), 5.0);
        let pts = primitive_intersections(&a, &b);
        assert_eq!(pts.len(), 2);
        for p in pts {
            assert!((p.x - 4.0).abs() < 1e-9);
            assert!((p.y.abs() - 3.0).abs() < 1e-9);
        }
        let inner = Primitive::circle(Point::new(0.0, 0.0), 1.0);
        assert!(primitive_intersections(&a, &inner).is_empty());
        let concentric = Primitive::circle(Point::new(0.0, 0.0), 5.0);
        assert!(primitive_intersections(&a, &concentric).is_empty());
    }

    #[test]
    fn test_circle_arc_span() {
        let a = Primitive::circle(Point::new(0.0, 0.0), 5.0);
        // Only the intersection with negative y lies inside the arc span.
        let b = Primitive::arc(Point::new(8.0, 0.0), 5.0, PI, 3.0 * FRAC_PI_2);
        let pts = primitive_intersections(&a, &b);
        assert_eq!(pts.len(), 1);
        assert!(pts[0].y < 0.0);
    }
}
