//! Designs: the ink and fills drawn for one tile shape.

use crate::fill::FillError;
use crate::ink::{InkId, InkPrimitive};
use crate::tile::{TileFrame, TileShape};
use kurbo::Point;
use thiserror::Error;

/// Store-assigned identity of a fill, used as its cache key. Not persisted.
pub type FillId = u64;

/// Index of a design within a store.
pub type DesignId = usize;

/// A paint-bucket fill anchored at a seed point.
#[derive(Debug, Clone, PartialEq)]
pub struct FillRegion {
    pub id: FillId,
    /// Seed in world units.
    pub seed: Point,
    /// Ink ids bounding the region; `None` until discovered.
    pub boundary_ink_ids: Option<Vec<InkId>>,
    pub uses_tile_boundary: bool,
}

impl FillRegion {
    pub fn new(id: FillId, seed: Point) -> Self {
        Self {
            id,
            seed,
            boundary_ink_ids: None,
            uses_tile_boundary: false,
        }
    }

    pub fn seed_local(&self, tile: &TileFrame) -> Point {
        tile.to_local(self.seed)
    }

    /// Boundary ids are present and every one still exists in `design`.
    pub fn has_valid_boundary(&self, design: &Design) -> bool {
        self.boundary_ink_ids
            .as_ref()
            .is_some_and(|ids| ids.iter().all(|id| design.contains_ink(*id)))
    }
}

/// Ordered ink and fills belonging to one tile shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub shape: TileShape,
    pub ink: Vec<InkPrimitive>,
    pub fills: Vec<FillRegion>,
}

impl Design {
    pub fn new(shape: TileShape) -> Self {
        Self {
            shape,
            ink: Vec::new(),
            fills: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ink.is_empty() && self.fills.is_empty()
    }

    pub fn contains_ink(&self, id: InkId) -> bool {
        self.ink.iter().any(|i| i.id == id)
    }

    pub fn ink_index(&self, id: InkId) -> Option<usize> {
        self.ink.iter().position(|i| i.id == id)
    }

    pub fn ink_ids(&self) -> Vec<InkId> {
        self.ink.iter().map(|i| i.id).collect()
    }

    /// Ink restricted to `ids`, in design order. `None` selects all ink.
    pub fn boundary_ink(&self, ids: Option<&[InkId]>) -> Vec<InkPrimitive> {
        match ids {
            None => self.ink.clone(),
            Some(ids) => self.ink.iter().filter(|i| ids.contains(&i.id)).copied().collect(),
        }
    }

    pub fn get_fill(&self, id: FillId) -> Option<&FillRegion> {
        self.fills.iter().find(|f| f.id == id)
    }

    pub fn fill_index(&self, id: FillId) -> Option<usize> {
        self.fills.iter().position(|f| f.id == id)
    }
}

/// Errors from design store operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DesignError {
    #[error("Design not found: {0}")]
    UnknownDesign(DesignId),
    #[error("Ink not found: {0}")]
    UnknownInk(InkId),
    #[error("No ink ids left to allocate")]
    InkIdsExhausted,
    #[error("Degenerate ink geometry")]
    Degenerate,
    #[error(transparent)]
    Fill(#[from] FillError),
}
