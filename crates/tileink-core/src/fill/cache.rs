//! Revision-stamped memoization of computed fills.

use super::discovery::discover;
use super::flood::TileRaster;
use super::{FillRenderData, FillResult};
use crate::config::FillConfig;
use crate::design::{Design, FillId, FillRegion};
use crate::ink::InkId;
use crate::tile::{TileFrame, TileShape};
use std::collections::HashMap;
use std::rc::Rc;

/// Everything a cached fill depends on besides its own seed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FillCacheKey {
    pub ink_revision: u64,
    pub geometry_revision: u64,
    /// `f64::to_bits` of the render scale.
    pub render_scale: u64,
    pub tile_shape: Option<TileShape>,
    /// `f64::to_bits` of the tile side.
    pub tile_side: u64,
    pub boundary_ink_ids: Vec<InkId>,
    pub uses_tile_boundary: bool,
}

/// Cache of [`FillRenderData`] per fill.
///
/// Invalidation is coarse: bumping either revision drops every entry.
#[derive(Debug, Default)]
pub struct FillCache {
    ink_revision: u64,
    geometry_revision: u64,
    entries: HashMap<FillId, (FillCacheKey, Rc<FillRenderData>)>,
}

impl FillCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ink_revision(&self) -> u64 {
        self.ink_revision
    }

    pub fn geometry_revision(&self) -> u64 {
        self.geometry_revision
    }

    /// Record an ink edit.
    pub fn bump_ink_revision(&mut self) {
        self.ink_revision += 1;
        self.entries.clear();
    }

    /// Record a change to tile geometry or render scale.
    pub fn bump_geometry_revision(&mut self) {
        self.geometry_revision += 1;
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove(&mut self, fill: FillId) {
        self.entries.remove(&fill);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Key for `fill` under the current revisions.
    pub fn key_for(&self, fill: &FillRegion, tile: &TileFrame, config: &FillConfig) -> FillCacheKey {
        FillCacheKey {
            ink_revision: self.ink_revision,
            geometry_revision: self.geometry_revision,
            render_scale: config.render_scale.to_bits(),
            tile_shape: tile.shape(),
            tile_side: tile.side().to_bits(),
            boundary_ink_ids: fill.boundary_ink_ids.clone().unwrap_or_default(),
            uses_tile_boundary: fill.uses_tile_boundary,
        }
    }

    pub fn get(&self, fill: FillId, key: &FillCacheKey) -> Option<Rc<FillRenderData>> {
        self.entries
            .get(&fill)
            .filter(|(k, _)| k == key)
            .map(|(_, data)| Rc::clone(data))
    }

    pub fn insert(&mut self, fill: FillId, key: FillCacheKey, data: FillRenderData) -> Rc<FillRenderData> {
        let data = Rc::new(data);
        self.entries.insert(fill, (key, Rc::clone(&data)));
        data
    }

    /// Render data for `fill`, discovering its boundary first when it is
    /// missing or refers to ink no longer in `design`. Discovery results are
    /// written back to `fill`.
    pub fn render(
        &mut self,
        fill: &mut FillRegion,
        tile: &TileFrame,
        design: &Design,
        config: &FillConfig,
    ) -> FillResult<Rc<FillRenderData>> {
        let seed = fill.seed_local(tile);
        let mut discovered = None;
        if !fill.has_valid_boundary(design) {
            let found = discover(seed, tile, &design.ink, config)?;
            fill.boundary_ink_ids = Some(found.boundary_ink_ids);
            fill.uses_tile_boundary = found.uses_tile_boundary;
            discovered = Some(found.data);
        }

        let key = self.key_for(fill, tile, config);
        if let Some(hit) = self.get(fill.id, &key) {
            log::trace!("fill cache hit for fill {}", fill.id);
            return Ok(hit);
        }
        let data = match discovered {
            Some(data) => data,
            None => {
                let ink = design.boundary_ink(fill.boundary_ink_ids.as_deref());
                TileRaster::new(tile, config).fill(seed, tile, &ink, config, true)?
            }
        };
        Ok(self.insert(fill.id, key, data))
    }
}

/// Renderer entry point: the fill's render data, or `None` if its seed is no
/// longer valid.
pub fn render(
    cache: &mut FillCache,
    fill: &mut FillRegion,
    tile: &TileFrame,
    design: &Design,
    config: &FillConfig,
) -> Option<Rc<FillRenderData>> {
    match cache.render(fill, tile, design, config) {
        Ok(data) => Some(data),
        Err(err) => {
            log::debug!("fill {} not rendered: {err}", fill.id);
            None
        }
    }
}
