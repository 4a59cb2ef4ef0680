//! Seeded flood fill over the wall raster.

use super::raster::{
    INK_CODE_OFFSET, RasterGrid, TILE_EDGE_CODE, code_for_ink, ink_for_code, paint_codes, paint_walls,
};
use super::{ContentSignature, FillError, FillMask, FillRenderData, FillResult};
use crate::config::FillConfig;
use crate::geometry::Primitive;
use crate::ink::InkPrimitive;
use crate::tile::TileFrame;
use kurbo::{Point, Rect};
use std::collections::{BTreeSet, VecDeque};

const NEIGHBORS_4: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Raster state that depends only on the tile: the grid and which pixels lie
/// inside the tile polygon. Built once and reused for every fill over the
/// same tile.
#[derive(Debug, Clone)]
pub struct TileRaster {
    grid: RasterGrid,
    inside: Vec<bool>,
}

impl TileRaster {
    pub fn new(tile: &TileFrame, config: &FillConfig) -> Self {
        let grid = RasterGrid::fit(
            tile.bounds(),
            config.tile_margin * config.render_scale,
            config.raster_target_px,
            config,
        );
        let mut inside = vec![false; grid.len()];
        for y in 0..grid.height {
            for x in 0..grid.width {
                inside[grid.index(x, y)] = tile.contains_local(grid.pixel_corner(x, y));
            }
        }
        Self { grid, inside }
    }

    pub fn grid(&self) -> &RasterGrid {
        &self.grid
    }

    /// Flood fill the region around `seed_local` bounded by the tile outline
    /// and `ink`. `closure` additionally runs the ink-only closure check.
    pub fn fill(
        &self,
        seed_local: Point,
        tile: &TileFrame,
        ink: &[InkPrimitive],
        config: &FillConfig,
        closure: bool,
    ) -> FillResult<FillRenderData> {
        if !tile.contains_local(seed_local) {
            return Err(FillError::SeedOutsideShape);
        }
        let grid = &self.grid;
        let (sx, sy) = grid.pixel_at(seed_local).ok_or(FillError::SeedOutsideShape)?;
        let seed = grid.index(sx, sy);
        if !self.inside[seed] {
            return Err(FillError::SeedOutsideShape);
        }

        let side = tile.side();
        let local: Vec<Primitive> = ink.iter().map(|i| i.to_local(side)).collect();
        let coded: Vec<(u32, Primitive)> = ink
            .iter()
            .zip(&local)
            .map(|(i, p)| (code_for_ink(i.id), *p))
            .collect();
        let walls = paint_walls(grid, Some(tile.polygon()), &local, config)?;
        if walls[seed] {
            return Err(FillError::SeedOnStroke);
        }
        let codes = paint_codes(grid, Some(tile.polygon()), &coded, config)?;

        let mut touched = BTreeSet::new();
        let mut uses_tile_boundary = false;
        let mut mask = vec![false; grid.len()];
        mask[seed] = true;
        let mut queue = VecDeque::from([(sx, sy)]);

        while let Some((x, y)) = queue.pop_front() {
            for (dx, dy) in NEIGHBORS_4 {
                let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                if nx < 0 || ny < 0 || nx >= grid.width as i64 || ny >= grid.height as i64 {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                let vi = grid.index(nx, ny);
                if mask[vi] || !self.inside[vi] {
                    continue;
                }
                if walls[vi] {
                    match codes[vi] {
                        TILE_EDGE_CODE => uses_tile_boundary = true,
                        code if code >= INK_CODE_OFFSET => {
                            touched.extend(ink_for_code(code));
                        }
                        _ => {}
                    }
                    continue;
                }
                mask[vi] = true;
                queue.push_back((nx, ny));
            }
        }

        for _ in 0..config.dilate_iterations {
            mask = dilate_open(grid, &mask, |vi| self.inside[vi] && !walls[vi]);
        }
        if uses_tile_boundary {
            for _ in 0..config.tile_seam_iterations {
                mask = dilate_into_code(grid, &mask, &codes, TILE_EDGE_CODE);
            }
        }

        let closed_by_ink = closure && closed_by_ink(seed_local, tile, ink, config);
        let mask = FillMask::new(grid.width, grid.height, mask);
        Ok(FillRenderData {
            signature: content_signature(&mask),
            mask,
            origin_local: grid.origin,
            extent_local: grid.extent(),
            scale: grid.scale,
            boundary_ink_ids: touched.into_iter().collect(),
            uses_tile_boundary,
            closed_by_ink,
        })
    }
}

/// One 4-neighbour dilation step into interior pixels accepted by `open`.
/// The raster border is never grown into.
fn dilate_open(grid: &RasterGrid, cur: &[bool], open: impl Fn(usize) -> bool) -> Vec<bool> {
    let w = grid.width as usize;
    let mut next = cur.to_vec();
    for y in 1..grid.height.saturating_sub(1) {
        for x in 1..grid.width.saturating_sub(1) {
            let vi = grid.index(x, y);
            if cur[vi] || !open(vi) {
                continue;
            }
            if cur[vi - 1] || cur[vi + 1] || cur[vi - w] || cur[vi + w] {
                next[vi] = true;
            }
        }
    }
    next
}

/// One 8-neighbour dilation step into pixels carrying `code`.
fn dilate_into_code(grid: &RasterGrid, cur: &[bool], codes: &[u32], code: u32) -> Vec<bool> {
    let w = grid.width as usize;
    let mut next = cur.to_vec();
    for y in 1..grid.height.saturating_sub(1) {
        for x in 1..grid.width.saturating_sub(1) {
            let vi = grid.index(x, y);
            if cur[vi] || codes[vi] != code {
                continue;
            }
            let hit = [vi - 1, vi + 1, vi - w, vi + w, vi - w - 1, vi - w + 1, vi + w - 1, vi + w + 1]
                .into_iter()
                .any(|n| cur[n]);
            if hit {
                next[vi] = true;
            }
        }
    }
    next
}

/// FNV-1a style hash over the row-major indices of set pixels.
pub fn content_signature(mask: &FillMask) -> ContentSignature {
    let mut count = 0u32;
    let mut hash = FNV_OFFSET;
    for idx in mask.set_indices() {
        count += 1;
        hash ^= idx as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    ContentSignature {
        width: mask.width(),
        height: mask.height(),
        count,
        hash,
    }
}

/// Whether `ink` alone (never the tile outline) encloses the seed.
///
/// Uses a tighter raster around the seed and the ink; escaping to the raster
/// border means the region is open.
pub fn closed_by_ink(seed_local: Point, tile: &TileFrame, ink: &[InkPrimitive], config: &FillConfig) -> bool {
    let local: Vec<Primitive> = ink
        .iter()
        .map(|i| i.to_local(tile.side()))
        .filter(|p| !p.is_degenerate())
        .collect();
    if local.is_empty() {
        return false;
    }
    let bounds = local
        .iter()
        .fold(Rect::from_points(seed_local, seed_local), |r, p| r.union(p.bounds()));
    let grid = RasterGrid::fit(
        bounds,
        config.closure_margin * config.render_scale,
        config.closure_target_px,
        config,
    );
    let walls = match paint_walls(&grid, None, &local, config) {
        Ok(walls) => walls,
        Err(err) => {
            log::debug!("closure raster unavailable: {err}");
            return false;
        }
    };
    let Some((sx, sy)) = grid.pixel_at(seed_local) else {
        return false;
    };
    let seed = grid.index(sx, sy);
    if walls[seed] {
        return false;
    }

    let mut visited = vec![false; grid.len()];
    visited[seed] = true;
    let mut queue = VecDeque::from([(sx, sy)]);
    while let Some((x, y)) = queue.pop_front() {
        if x == 0 || y == 0 || x == grid.width - 1 || y == grid.height - 1 {
            return false;
        }
        for (dx, dy) in NEIGHBORS_4 {
            let (nx, ny) = ((x as i64 + dx) as u32, (y as i64 + dy) as u32);
            let vi = grid.index(nx, ny);
            if visited[vi] || walls[vi] {
                continue;
            }
            visited[vi] = true;
            queue.push_back((nx, ny));
        }
    }
    true
}
