//! Vector boundary reconstruction.
//!
//! Boundary primitives are split at their mutual intersections, each piece is
//! oriented by probing the fill mask on both sides, and the oriented pieces
//! are walked into closed loops.

mod arrangement;
mod graph;
mod path;

pub use arrangement::{DirectedEdge, EdgeShape, Side, SubEdge, inside_side, orient, slice, split_parameters};
pub use graph::ArrangementGraph;
pub use path::{ClosedLoop, LoopCommand, format_number, loops_to_bez_path, loops_to_svg_path_data};

use crate::config::FillConfig;
use crate::design::{Design, FillRegion};
use crate::fill::{FillCache, render};
use crate::geometry::Primitive;
use crate::tile::TileFrame;
use kurbo::Point;

/// Rebuild closed loops bounding the region where `inside` holds.
///
/// `sample_base` is the smallest probe offset used to decide which side of a
/// boundary piece the region lies on.
pub fn reconstruct(
    primitives: &[Primitive],
    inside: impl Fn(Point) -> bool,
    sample_base: f64,
    config: &FillConfig,
) -> Vec<ClosedLoop> {
    let primitives: Vec<Primitive> = primitives.iter().filter(|p| !p.is_degenerate()).copied().collect();
    if primitives.is_empty() {
        return Vec::new();
    }
    let splits = split_parameters(&primitives);
    let edges: Vec<DirectedEdge> = slice(&primitives, &splits)
        .iter()
        .filter_map(|e| orient(e, sample_base, &config.probe_multipliers, &inside))
        .collect();
    if edges.is_empty() {
        return Vec::new();
    }

    let graph = ArrangementGraph::new(edges, config.vertex_quantization);
    graph
        .closed_loops()
        .into_iter()
        .map(|walk| ClosedLoop {
            start: graph.edge(walk[0]).start,
            commands: walk.iter().map(|&i| LoopCommand::from_edge(graph.edge(i))).collect(),
        })
        .collect()
}

/// Exporter entry point: closed vector loops for a fill, in tile-local
/// coordinates. Empty when the fill cannot be rendered.
pub fn vectorize(
    cache: &mut FillCache,
    fill: &mut FillRegion,
    tile: &TileFrame,
    design: &Design,
    config: &FillConfig,
) -> Vec<ClosedLoop> {
    let Some(data) = render(cache, fill, tile, design, config) else {
        return Vec::new();
    };
    let Some(ids) = fill.boundary_ink_ids.as_deref() else {
        return Vec::new();
    };
    let mut primitives: Vec<Primitive> = design
        .boundary_ink(Some(ids))
        .iter()
        .map(|ink| ink.to_local(tile.side()))
        .collect();
    if fill.uses_tile_boundary {
        primitives.extend(tile.edges());
    }
    reconstruct(
        &primitives,
        |p| data.contains(p),
        config.probe_offset(tile.side()),
        config,
    )
}
