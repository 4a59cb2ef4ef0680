//! TileInk Core Library
//!
//! Boundary-constrained region fill and vectorization for tile designs: ink
//! strokes drawn inside a tile polygon, paint-bucket fills discovered on a
//! raster, and closed vector loops rebuilt from the strokes that bound them.

pub mod config;
pub mod design;
pub mod fill;
pub mod geometry;
pub mod ink;
pub mod storage;
pub mod store;
pub mod tile;
pub mod vector;

pub use config::{ConfigError, FillConfig};
pub use design::{Design, DesignError, DesignId, FillId, FillRegion};
pub use fill::{ContentSignature, FillCache, FillError, FillRenderData, FillResult, contains, render};
pub use geometry::Primitive;
pub use ink::{InkId, InkIdAllocator, InkPrimitive};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult, TileDocument};
pub use store::{Deleted, DesignStore};
pub use tile::{TileFrame, TileShape};
pub use vector::{ClosedLoop, LoopCommand, loops_to_bez_path, loops_to_svg_path_data, vectorize};
