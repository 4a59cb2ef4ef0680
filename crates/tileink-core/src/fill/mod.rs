//! Raster region fill: flood fill, boundary discovery and the render cache.

mod cache;
mod discovery;
mod flood;
mod raster;

pub use cache::{FillCache, FillCacheKey, render};
pub use discovery::{Discovery, discover, discover_with};
pub use flood::{TileRaster, closed_by_ink, content_signature};
pub use raster::{INK_CODE_OFFSET, RasterGrid, TILE_EDGE_CODE, bez_to_skia, paint_walls};

use crate::ink::InkId;
use kurbo::{Point, Rect, Size};
use thiserror::Error;

/// Reasons a fill cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FillError {
    #[error("Seed is outside the tile shape")]
    SeedOutsideShape,
    #[error("Seed is on a stroke")]
    SeedOnStroke,
    #[error("Could not allocate a {width}x{height} raster")]
    RasterAllocation { width: u32, height: u32 },
}

/// Result type for fill operations.
pub type FillResult<T> = Result<T, FillError>;

/// Summary of a mask's pixel membership, used to compare fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentSignature {
    pub width: u32,
    pub height: u32,
    pub count: u32,
    pub hash: u32,
}

impl std::fmt::Display for ContentSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}:{}", self.width, self.height, self.count, self.hash)
    }
}

/// Binary raster mask, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl FillMask {
    /// Wrap a row-major bit buffer. Short buffers are padded with unset pixels.
    pub fn new(width: u32, height: u32, mut bits: Vec<bool>) -> Self {
        bits.resize(width as usize * height as usize, false);
        Self { width, height, bits }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Row-major indices of set pixels, ascending.
    pub fn set_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter().enumerate().filter(|(_, b)| **b).map(|(i, _)| i)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }
}

/// Everything a renderer or exporter needs about one computed fill.
#[derive(Debug, Clone, PartialEq)]
pub struct FillRenderData {
    pub mask: FillMask,
    /// Tile-local coordinates of the mask's top-left corner.
    pub origin_local: Point,
    /// Tile-local size covered by the mask.
    pub extent_local: Size,
    /// Mask pixels per local unit.
    pub scale: f64,
    pub signature: ContentSignature,
    /// Ink ids whose strokes the fill ran into, ascending.
    pub boundary_ink_ids: Vec<InkId>,
    pub uses_tile_boundary: bool,
    pub closed_by_ink: bool,
}

impl FillRenderData {
    /// Nearest-pixel mask lookup at a tile-local point.
    pub fn contains(&self, p: Point) -> bool {
        let o = self.origin_local;
        if p.x < o.x || p.y < o.y || p.x > o.x + self.extent_local.width || p.y > o.y + self.extent_local.height {
            return false;
        }
        let x = ((p.x - o.x) * self.scale).floor();
        let y = ((p.y - o.y) * self.scale).floor();
        if x < 0.0 || y < 0.0 {
            return false;
        }
        self.mask.get(x as u32, y as u32)
    }

    /// Local-space bounds of the mask raster.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin_local, self.extent_local)
    }

    /// Area covered by set pixels, in local units squared.
    pub fn mask_area_local(&self) -> f64 {
        self.mask.count() as f64 / (self.scale * self.scale)
    }
}

/// Hit test against a computed fill.
pub fn contains(data: &FillRenderData, p: Point) -> bool {
    data.contains(p)
}
