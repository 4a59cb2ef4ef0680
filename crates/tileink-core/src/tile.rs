//! Tile frames: the polygon a design is drawn in and its world scale.

use crate::geometry::{Primitive, point_in_polygon, point_in_triangle, points_bounds};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Regular tile shapes a design can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileShape {
    Triangle,
    Square,
    Hexagon,
    Octagon,
}

impl TileShape {
    pub const ALL: [TileShape; 4] = [
        TileShape::Triangle,
        TileShape::Square,
        TileShape::Hexagon,
        TileShape::Octagon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TileShape::Triangle => "triangle",
            TileShape::Square => "square",
            TileShape::Hexagon => "hexagon",
            TileShape::Octagon => "octagon",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Vertices centred on the origin for a tile of the given side.
    pub fn polygon(self, side: f64) -> Vec<Point> {
        match self {
            TileShape::Triangle => {
                let h = side * 3f64.sqrt() / 2.0;
                vec![
                    Point::new(0.0, -2.0 * h / 3.0),
                    Point::new(-side / 2.0, h / 3.0),
                    Point::new(side / 2.0, h / 3.0),
                ]
            }
            TileShape::Square => {
                let s = side / 2.0;
                vec![
                    Point::new(-s, -s),
                    Point::new(s, -s),
                    Point::new(s, s),
                    Point::new(-s, s),
                ]
            }
            TileShape::Hexagon => regular_polygon(6, side, -FRAC_PI_2),
            TileShape::Octagon => regular_polygon(8, side, -FRAC_PI_2 + PI / 8.0),
        }
    }
}

impl std::fmt::Display for TileShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn regular_polygon(n: usize, radius: f64, start: f64) -> Vec<Point> {
    (0..n)
        .map(|i| (Vec2::from_angle(start + i as f64 * TAU / n as f64) * radius).to_point())
        .collect()
}

/// A convex tile polygon in local pixels plus the side length that maps
/// local coordinates to world units (`world = local / side`).
#[derive(Debug, Clone, PartialEq)]
pub struct TileFrame {
    shape: Option<TileShape>,
    polygon: Vec<Point>,
    side: f64,
}

impl TileFrame {
    pub fn new(shape: TileShape, side: f64) -> Self {
        Self {
            shape: Some(shape),
            polygon: shape.polygon(side),
            side,
        }
    }

    /// Frame around an arbitrary convex polygon. Needs 3 to 8 vertices and a
    /// positive side.
    pub fn from_polygon(polygon: Vec<Point>, side: f64) -> Option<Self> {
        if !(3..=8).contains(&polygon.len()) || side.is_nan() || side <= 0.0 {
            return None;
        }
        Some(Self {
            shape: None,
            polygon,
            side,
        })
    }

    pub fn shape(&self) -> Option<TileShape> {
        self.shape
    }

    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }

    pub fn side(&self) -> f64 {
        self.side
    }

    pub fn bounds(&self) -> Rect {
        points_bounds(&self.polygon).unwrap_or(Rect::ZERO)
    }

    pub fn contains_local(&self, p: Point) -> bool {
        match self.polygon.as_slice() {
            [a, b, c] => point_in_triangle(p, *a, *b, *c),
            poly => point_in_polygon(p, poly),
        }
    }

    pub fn to_local(&self, world: Point) -> Point {
        (world.to_vec2() * self.side).to_point()
    }

    pub fn to_world(&self, local: Point) -> Point {
        (local.to_vec2() / self.side).to_point()
    }

    /// Polygon edges as line primitives, skipping zero-length ones.
    pub fn edges(&self) -> Vec<Primitive> {
        let n = self.polygon.len();
        (0..n)
            .map(|i| Primitive::line(self.polygon[i], self.polygon[(i + 1) % n]))
            .filter(|e| !e.is_degenerate())
            .collect()
    }

    /// Area of the polygon in local pixels squared.
    pub fn area(&self) -> f64 {
        let n = self.polygon.len();
        let twice: f64 = (0..n)
            .map(|i| self.polygon[i].to_vec2().cross(self.polygon[(i + 1) % n].to_vec2()))
            .sum();
        twice.abs() / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_names_round_trip() {
        for shape in TileShape::ALL {
            assert_eq!(TileShape::from_name(shape.name()), Some(shape));
        }
        assert_eq!(TileShape::from_name("pentagon"), None);
    }

    #[test]
    fn test_triangle_centroid_at_origin() {
        let tile = TileFrame::new(TileShape::Triangle, 120.0);
        let poly = tile.polygon();
        let cx = poly.iter().map(|p| p.x).sum::<f64>() / 3.0;
        let cy = poly.iter().map(|p| p.y).sum::<f64>() / 3.0;
        assert!(cx.abs() < 1e-9 && cy.abs() < 1e-9);
        assert!(tile.contains_local(Point::ZERO));
        // Apex points up in y-down coordinates.
        assert!(poly[0].y < 0.0);
    }

    #[test]
    fn test_areas() {
        let sq = TileFrame::new(TileShape::Square, 100.0);
        assert!((sq.area() - 10_000.0).abs() < 1e-6);
        let tri = TileFrame::new(TileShape::Triangle, 100.0);
        assert!((tri.area() - 100.0 * 100.0 * 3f64.sqrt() / 4.0).abs() < 1e-6);
        let hex = TileFrame::new(TileShape::Hexagon, 100.0);
        assert!((hex.area() - 1.5 * 3f64.sqrt() * 100.0 * 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_hexagon_vertex_up() {
        let hex = TileFrame::new(TileShape::Hexagon, 50.0);
        let top = hex.polygon()[0];
        assert!(top.x.abs() < 1e-9);
        assert!((top.y + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_world_local_conversion() {
        let tile = TileFrame::new(TileShape::Octagon, 80.0);
        let world = Point::new(0.25, -0.125);
        let local = tile.to_local(world);
        assert_eq!(local, Point::new(20.0, -10.0));
        assert_eq!(tile.to_world(local), world);
    }

    #[test]
    fn test_contains_local() {
        let sq = TileFrame::new(TileShape::Square, 100.0);
        assert!(sq.contains_local(Point::new(49.0, -49.0)));
        assert!(!sq.contains_local(Point::new(51.0, 0.0)));
        let oct = TileFrame::new(TileShape::Octagon, 100.0);
        assert!(oct.contains_local(Point::new(0.0, 90.0)));
        assert!(!oct.contains_local(Point::new(0.0, 95.0)));
        assert!(!oct.contains_local(Point::new(90.0, 90.0)));
    }

    #[test]
    fn test_from_polygon_validation() {
        assert!(TileFrame::from_polygon(vec![Point::ZERO, Point::new(1.0, 0.0)], 1.0).is_none());
        let tri = vec![Point::ZERO, Point::new(10.0, 0.0), Point::new(0.0, 10.0)];
        assert!(TileFrame::from_polygon(tri.clone(), 0.0).is_none());
        let frame = TileFrame::from_polygon(tri, 10.0).unwrap();
        assert_eq!(frame.shape(), None);
        assert_eq!(frame.edges().len(), 3);
    }
}
