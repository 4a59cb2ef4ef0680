//! Closed loops and their SVG / Bezier forms.

use kurbo::{Arc, BezPath, Point, SvgArc, Vec2};
use std::f64::consts::PI;
use std::fmt::Write as _;

use super::arrangement::{DirectedEdge, EdgeShape};

/// One drawing command of a closed loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopCommand {
    Line {
        to: Point,
    },
    /// Circular arc with SVG-style flags. `sweep` is set when the arc runs in
    /// the direction of increasing angle.
    Arc {
        to: Point,
        radius: f64,
        large_arc: bool,
        sweep: bool,
    },
}

impl LoopCommand {
    pub fn to(&self) -> Point {
        match *self {
            LoopCommand::Line { to } | LoopCommand::Arc { to, .. } => to,
        }
    }

    pub(crate) fn from_edge(edge: &DirectedEdge) -> Self {
        match edge.shape {
            EdgeShape::Line => LoopCommand::Line { to: edge.end },
            EdgeShape::Arc { radius, ccw, .. } => LoopCommand::Arc {
                to: edge.end,
                radius,
                large_arc: edge.sweep() > PI,
                sweep: ccw,
            },
        }
    }
}

/// A closed boundary loop in tile-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedLoop {
    pub start: Point,
    pub commands: Vec<LoopCommand>,
}

impl ClosedLoop {
    /// SVG path data for this loop: `M … L … A … Z`.
    pub fn to_svg_path_data(&self) -> String {
        let mut d = format!("M {}", svg_point(self.start));
        for cmd in &self.commands {
            // Writing to a String cannot fail.
            let _ = match *cmd {
                LoopCommand::Line { to } => write!(d, " L {}", svg_point(to)),
                LoopCommand::Arc {
                    to,
                    radius,
                    large_arc,
                    sweep,
                } => {
                    let r = format_number(radius);
                    write!(
                        d,
                        " A {r} {r} 0 {} {} {}",
                        u8::from(large_arc),
                        u8::from(sweep),
                        svg_point(to)
                    )
                }
            };
        }
        d.push_str(" Z");
        d
    }

    /// Append this loop to a Bezier path, arcs converted to cubics.
    pub fn append_to(&self, path: &mut BezPath, tolerance: f64) {
        path.move_to(self.start);
        let mut from = self.start;
        for cmd in &self.commands {
            match *cmd {
                LoopCommand::Line { to } => path.line_to(to),
                LoopCommand::Arc {
                    to,
                    radius,
                    large_arc,
                    sweep,
                } => {
                    let svg = SvgArc {
                        from,
                        to,
                        radii: Vec2::new(radius, radius),
                        x_rotation: 0.0,
                        large_arc,
                        sweep,
                    };
                    match Arc::from_svg_arc(&svg) {
                        Some(arc) => path.extend(arc.append_iter(tolerance)),
                        None => path.line_to(to),
                    }
                }
            }
            from = cmd.to();
        }
        path.close_path();
    }

    pub fn to_bez_path(&self, tolerance: f64) -> BezPath {
        let mut path = BezPath::new();
        self.append_to(&mut path, tolerance);
        path
    }
}

/// All loops of a fill as one SVG path data string.
pub fn loops_to_svg_path_data(loops: &[ClosedLoop]) -> String {
    loops.iter().map(ClosedLoop::to_svg_path_data).collect::<Vec<_>>().join(" ")
}

/// All loops of a fill as one path, meant to be filled even-odd.
pub fn loops_to_bez_path(loops: &[ClosedLoop], tolerance: f64) -> BezPath {
    let mut path = BezPath::new();
    for l in loops {
        l.append_to(&mut path, tolerance);
    }
    path
}

/// Four decimals, trailing zeros trimmed, tiny values snapped to zero.
pub fn format_number(n: f64) -> String {
    let v = if n.abs() < 1e-8 { 0.0 } else { n };
    let mut s = format!("{v:.4}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

fn svg_point(p: Point) -> String {
    format!("{} {}", format_number(p.x), format_number(p.y))
}
