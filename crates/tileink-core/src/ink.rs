//! Ink strokes and the global ink id namespace.

use crate::geometry::Primitive;
use serde::{Deserialize, Serialize};

/// Stable id of an ink stroke, unique across every design of a document.
pub type InkId = u32;

/// A stroke primitive in world units together with its global id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkPrimitive {
    pub id: InkId,
    #[serde(flatten)]
    pub primitive: Primitive,
}

impl InkPrimitive {
    pub fn new(id: InkId, primitive: Primitive) -> Self {
        Self { id, primitive }
    }

    /// Geometry in tile-local pixels for a tile of the given side.
    pub fn to_local(&self, side: f64) -> Primitive {
        self.primitive.scaled(side)
    }
}

/// Hands out ink ids. Ids start at 1 and are never reused; once
/// `InkId::MAX` has been issued the allocator is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkIdAllocator {
    next: Option<InkId>,
}

impl Default for InkIdAllocator {
    fn default() -> Self {
        Self { next: Some(1) }
    }
}

impl InkIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next call to [`allocate`](Self::allocate) would return.
    pub fn peek(&self) -> Option<InkId> {
        self.next
    }

    pub fn allocate(&mut self) -> Option<InkId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(id)
    }

    /// Mark an externally assigned id as taken.
    pub fn reserve(&mut self, id: InkId) {
        if self.next.is_some_and(|next| id >= next) {
            self.next = id.checked_add(1);
        }
    }
}
