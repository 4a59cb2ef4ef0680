//! Minimal boundary discovery.
//!
//! Finds which ink strokes are load-bearing for the region around a seed by
//! dropping each stroke in turn and checking whether the fill changes. The
//! result is greedy: two strokes that are only redundant together are both
//! kept.

use super::flood::TileRaster;
use super::{FillRenderData, FillResult};
use crate::config::FillConfig;
use crate::ink::{InkId, InkPrimitive};
use crate::tile::TileFrame;
use kurbo::Point;

/// Outcome of boundary discovery for one seed.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    /// Ink ids bounding the region, ascending.
    pub boundary_ink_ids: Vec<InkId>,
    pub uses_tile_boundary: bool,
    /// Fill computed with only the boundary ink.
    pub data: FillRenderData,
}

/// Discover the boundary of the region around `seed_local` among `ink`.
pub fn discover(seed_local: Point, tile: &TileFrame, ink: &[InkPrimitive], config: &FillConfig) -> FillResult<Discovery> {
    discover_with(&TileRaster::new(tile, config), seed_local, tile, ink, config)
}

/// Like [`discover`], reusing a prepared tile raster.
pub fn discover_with(
    raster: &TileRaster,
    seed_local: Point,
    tile: &TileFrame,
    ink: &[InkPrimitive],
    config: &FillConfig,
) -> FillResult<Discovery> {
    let full = raster.fill(seed_local, tile, ink, config, false)?;

    let mut retained: Vec<InkPrimitive> = Vec::new();
    for candidate in ink {
        let without: Vec<InkPrimitive> = ink.iter().filter(|i| i.id != candidate.id).copied().collect();
        let load_bearing = match raster.fill(seed_local, tile, &without, config, false) {
            Ok(data) => data.signature != full.signature,
            Err(_) => true,
        };
        if load_bearing {
            retained.push(*candidate);
        }
    }
    log::debug!(
        "boundary discovery kept {} of {} strokes at ({:.2}, {:.2})",
        retained.len(),
        ink.len(),
        seed_local.x,
        seed_local.y
    );

    let data = raster.fill(seed_local, tile, &retained, config, true)?;
    Ok(Discovery {
        boundary_ink_ids: data.boundary_ink_ids.clone(),
        uses_tile_boundary: data.uses_tile_boundary,
        data,
    })
}
