//! Primitive geometry kernel: lines, circles and arcs.

mod angle;
mod intersect;
mod primitive;

pub use angle::{
    ANGLE_EPS, angle_delta_ccw, angle_delta_cw, angle_in_arc, angle_of, angle_wrap, ccw_tangent,
    normalize_angle_list, point_on_circle,
};
pub use intersect::{
    DEDUPE_EPS, circle_circle_intersections, dedupe_points, primitive_intersections,
    segment_circle_intersections, segment_intersection,
};
pub use primitive::{
    DEGENERATE_EPS, ON_PRIMITIVE_EPS, Primitive, line_param_at, point_to_segment_dist,
};

use kurbo::{Point, Rect};

/// Even-odd ray cast point-in-polygon test.
pub fn point_in_polygon(p: Point, poly: &[Point]) -> bool {
    let mut inside = false;
    let n = poly.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = poly[i];
        let b = poly[j];
        if (a.y > p.y) != (b.y > p.y) {
            let dy = b.y - a.y;
            let dy = if dy == 0.0 { 1e-9 } else { dy };
            if p.x < (b.x - a.x) * (p.y - a.y) / dy + a.x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Sign-based point-in-triangle test; points on an edge count as inside.
pub fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let side = |p1: Point, p2: Point, p3: Point| (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y);
    let d1 = side(p, a, b);
    let d2 = side(p, b, c);
    let d3 = side(p, c, a);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Bounding box of a set of points, `None` when empty.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    Some(rest.iter().fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)))
}
