//! Directed arrangement graph and loop extraction.
//!
//! Vertices and edges live in flat arenas addressed by index; coincident
//! endpoints are merged through a quantized coordinate key.

use super::arrangement::DirectedEdge;
use kurbo::Point;
use std::collections::HashMap;
use std::f64::consts::TAU;

type VertexKey = (i64, i64);

#[derive(Debug, Clone)]
struct GraphEdge {
    edge: DirectedEdge,
    from: usize,
    to: usize,
}

/// Directed graph over oriented boundary sub-edges.
#[derive(Debug, Clone, Default)]
pub struct ArrangementGraph {
    vertices: Vec<Point>,
    vertex_index: HashMap<VertexKey, usize>,
    edges: Vec<GraphEdge>,
    outgoing: Vec<Vec<usize>>,
    quantization: f64,
}

impl ArrangementGraph {
    /// Build the graph. Endpoints equal after rounding to `1 / quantization`
    /// become one vertex.
    pub fn new(edges: Vec<DirectedEdge>, quantization: f64) -> Self {
        let mut graph = Self {
            quantization,
            ..Self::default()
        };
        for edge in edges {
            let from = graph.vertex_for(edge.start);
            let to = graph.vertex_for(edge.end);
            graph.outgoing[from].push(graph.edges.len());
            graph.edges.push(GraphEdge { edge, from, to });
        }
        graph
    }

    fn key(&self, p: Point) -> VertexKey {
        ((p.x * self.quantization).round() as i64, (p.y * self.quantization).round() as i64)
    }

    fn vertex_for(&mut self, p: Point) -> usize {
        let key = self.key(p);
        if let Some(&idx) = self.vertex_index.get(&key) {
            return idx;
        }
        let idx = self.vertices.len();
        self.vertices.push(p);
        self.vertex_index.insert(key, idx);
        self.outgoing.push(Vec::new());
        idx
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge(&self, idx: usize) -> &DirectedEdge {
        &self.edges[idx].edge
    }

    /// Unused outgoing edge at `vertex` with the smallest turn from `incoming`,
    /// turns measured in `[0, TAU)`.
    fn next_edge(&self, vertex: usize, incoming: kurbo::Vec2, used: &[bool]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &idx in &self.outgoing[vertex] {
            if used[idx] {
                continue;
            }
            let dir = self.edges[idx].edge.start_dir;
            let mut turn = incoming.cross(dir).atan2(incoming.dot(dir));
            if turn < 0.0 {
                turn += TAU;
            }
            if best.is_none_or(|(_, t)| turn < t) {
                best = Some((idx, turn));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Walk closed loops of edge indices. Walks that dead-end or exceed the
    /// step guard are discarded.
    pub fn closed_loops(&self) -> Vec<Vec<usize>> {
        let mut used = vec![false; self.edges.len()];
        let mut loops = Vec::new();
        let guard = self.edges.len() + 5;

        for first in 0..self.edges.len() {
            if used[first] {
                continue;
            }
            let start = self.edges[first].from;
            let mut walk = Vec::new();
            let mut cur = first;
            let mut closed = false;
            for _ in 0..guard {
                if used[cur] {
                    break;
                }
                used[cur] = true;
                walk.push(cur);
                let edge = &self.edges[cur];
                if edge.to == start {
                    closed = true;
                    break;
                }
                match self.next_edge(edge.to, edge.edge.end_dir, &used) {
                    Some(next) => cur = next,
                    None => break,
                }
            }
            if closed {
                loops.push(walk);
            } else {
                log::debug!("dropping unresolved boundary walk of {} edges", walk.len());
            }
        }
        loops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::arrangement::EdgeShape;
    use kurbo::Vec2;

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> DirectedEdge {
        let start = Point::new(ax, ay);
        let end = Point::new(bx, by);
        let d = end - start;
        let dir = d / d.hypot();
        DirectedEdge {
            shape: EdgeShape::Line,
            start,
            end,
            start_dir: dir,
            end_dir: dir,
        }
    }

    #[test]
    fn test_square_loop() {
        let edges = vec![
            seg(0.0, 0.0, 10.0, 0.0),
            seg(10.0, 0.0, 10.0, 10.0),
            seg(10.0, 10.0, 0.0, 10.0),
            seg(0.0, 10.0, 0.0, 0.0),
        ];
        let graph = ArrangementGraph::new(edges, 1e4);
        assert_eq!(graph.vertex_count(), 4);
        assert_eq!(graph.closed_loops(), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_near_coincident_endpoints_merge() {
        let edges = vec![
            seg(0.0, 0.0, 10.0, 0.0),
            seg(10.00000001, 0.0, 5.0, 8.0),
            seg(5.0, 8.0, 0.0, 0.0),
        ];
        let graph = ArrangementGraph::new(edges, 1e4);
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.closed_loops().len(), 1);
    }

    #[test]
    fn test_open_chain_is_dropped() {
        let edges = vec![seg(0.0, 0.0, 10.0, 0.0), seg(10.0, 0.0, 10.0, 10.0)];
        let graph = ArrangementGraph::new(edges, 1e4);
        assert!(graph.closed_loops().is_empty());
    }

    #[test]
    fn test_smallest_turn_wins() {
        // Two loops share the vertex (10, 0); from the incoming +x direction
        // the +y branch is a quarter turn and the -y branch three quarters.
        let edges = vec![
            seg(0.0, 0.0, 10.0, 0.0),
            seg(10.0, 0.0, 10.0, -10.0),
            seg(10.0, 0.0, 10.0, 10.0),
            seg(10.0, 10.0, 0.0, 0.0),
        ];
        let graph = ArrangementGraph::new(edges, 1e4);
        let loops = graph.closed_loops();
        assert_eq!(loops[0], vec![0, 2, 3]);
        assert_eq!(graph.edge(2).start_dir, Vec2::new(0.0, 1.0));
    }
}
