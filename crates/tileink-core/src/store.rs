//! Design store: owns designs, the ink id namespace and the fill cache.

use crate::config::FillConfig;
use crate::design::{Design, DesignError, DesignId, FillId, FillRegion};
use crate::fill::{FillCache, FillRenderData, discover, render};
use crate::geometry::{Primitive, angle_in_arc, angle_of, point_to_segment_dist};
use crate::ink::{InkId, InkIdAllocator, InkPrimitive};
use crate::tile::{TileFrame, TileShape};
use crate::vector::{ClosedLoop, vectorize};
use kurbo::Point;
use std::rc::Rc;

/// What [`DesignStore::delete_at_point`] removed.
#[derive(Debug, Clone, PartialEq)]
pub enum Deleted {
    Ink(InkPrimitive),
    Fill(FillRegion),
}

/// Owns every design of a document.
///
/// Ink ids come from one allocator shared by all designs, so a fill's
/// boundary ids are unambiguous across designs.
#[derive(Debug)]
pub struct DesignStore {
    designs: Vec<Design>,
    ink_ids: InkIdAllocator,
    next_fill_id: FillId,
    cache: FillCache,
    config: FillConfig,
}

impl Default for DesignStore {
    fn default() -> Self {
        Self::new(FillConfig::default())
    }
}

impl DesignStore {
    pub fn new(config: FillConfig) -> Self {
        Self {
            designs: Vec::new(),
            ink_ids: InkIdAllocator::new(),
            next_fill_id: 1,
            cache: FillCache::new(),
            config,
        }
    }

    /// Adopt already sanitized designs. Fill ids are reassigned and the ink
    /// allocator continues after the largest id present.
    pub fn from_designs(designs: Vec<Design>, config: FillConfig) -> Self {
        let mut store = Self::new(config);
        for mut design in designs {
            for ink in &design.ink {
                store.ink_ids.reserve(ink.id);
            }
            for fill in &mut design.fills {
                fill.id = store.allocate_fill_id();
            }
            store.designs.push(design);
        }
        store
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    pub fn cache(&self) -> &FillCache {
        &self.cache
    }

    pub fn designs(&self) -> &[Design] {
        &self.designs
    }

    pub fn design(&self, id: DesignId) -> Result<&Design, DesignError> {
        self.designs.get(id).ok_or(DesignError::UnknownDesign(id))
    }

    /// `None` once every ink id has been issued.
    pub fn next_ink_id(&self) -> Option<InkId> {
        self.ink_ids.peek()
    }

    fn allocate_fill_id(&mut self) -> FillId {
        let id = self.next_fill_id;
        self.next_fill_id += 1;
        id
    }

    fn check_design(&self, id: DesignId) -> Result<(), DesignError> {
        self.design(id).map(|_| ())
    }

    pub fn add_design(&mut self, shape: TileShape) -> DesignId {
        self.designs.push(Design::new(shape));
        self.designs.len() - 1
    }

    /// Add a stroke (world units) and return its new id.
    pub fn add_ink(&mut self, design: DesignId, primitive: Primitive) -> Result<InkId, DesignError> {
        self.check_design(design)?;
        let primitive = primitive.normalized();
        if primitive.is_degenerate() {
            return Err(DesignError::Degenerate);
        }
        let id = self.ink_ids.allocate().ok_or(DesignError::InkIdsExhausted)?;
        self.designs[design].ink.push(InkPrimitive::new(id, primitive));
        self.cache.bump_ink_revision();
        Ok(id)
    }

    /// Replace a stroke's geometry, then drop fills the edit opened up.
    pub fn update_ink(
        &mut self,
        design: DesignId,
        tile: &TileFrame,
        id: InkId,
        primitive: Primitive,
    ) -> Result<(), DesignError> {
        self.check_design(design)?;
        let primitive = primitive.normalized();
        if primitive.is_degenerate() {
            return Err(DesignError::Degenerate);
        }
        let idx = self.designs[design].ink_index(id).ok_or(DesignError::UnknownInk(id))?;
        self.designs[design].ink[idx].primitive = primitive;
        self.cache.bump_ink_revision();
        self.prune_fills(design, tile, &[id], &[]);
        Ok(())
    }

    /// Remove a stroke, then drop fills it bounded.
    pub fn delete_ink(&mut self, design: DesignId, tile: &TileFrame, id: InkId) -> Result<InkPrimitive, DesignError> {
        self.check_design(design)?;
        let idx = self.designs[design].ink_index(id).ok_or(DesignError::UnknownInk(id))?;
        let removed = self.designs[design].ink.remove(idx);
        self.cache.bump_ink_revision();
        self.prune_fills(design, tile, &[], &[id]);
        Ok(removed)
    }

    /// Fill the region around a tile-local seed. Nothing changes when the
    /// seed is invalid.
    pub fn create_fill(&mut self, design: DesignId, tile: &TileFrame, seed_local: Point) -> Result<FillId, DesignError> {
        self.check_design(design)?;
        let found = discover(seed_local, tile, &self.designs[design].ink, &self.config)?;
        let id = self.allocate_fill_id();
        let mut fill = FillRegion::new(id, tile.to_world(seed_local));
        fill.boundary_ink_ids = Some(found.boundary_ink_ids);
        fill.uses_tile_boundary = found.uses_tile_boundary;

        let key = self.cache.key_for(&fill, tile, &self.config);
        self.cache.insert(id, key, found.data);
        log::debug!(
            "created fill {id} bounded by {:?} (tile edge: {})",
            fill.boundary_ink_ids,
            fill.uses_tile_boundary
        );
        self.designs[design].fills.push(fill);
        Ok(id)
    }

    /// Render data for one fill, rediscovering its boundary if needed.
    pub fn render_fill(&mut self, design: DesignId, tile: &TileFrame, fill: FillId) -> Option<Rc<FillRenderData>> {
        let idx = self.designs.get(design)?.fill_index(fill)?;
        let mut region = self.designs[design].fills[idx].clone();
        let data = render(&mut self.cache, &mut region, tile, &self.designs[design], &self.config);
        self.designs[design].fills[idx] = region;
        data
    }

    /// Closed vector loops for one fill, in tile-local coordinates.
    pub fn vectorize_fill(&mut self, design: DesignId, tile: &TileFrame, fill: FillId) -> Vec<ClosedLoop> {
        let Some(idx) = self.designs.get(design).and_then(|d| d.fill_index(fill)) else {
            return Vec::new();
        };
        let mut region = self.designs[design].fills[idx].clone();
        let loops = vectorize(&mut self.cache, &mut region, tile, &self.designs[design], &self.config);
        self.designs[design].fills[idx] = region;
        loops
    }

    /// Topmost fill whose mask contains a tile-local point.
    pub fn fill_at_point(&mut self, design: DesignId, tile: &TileFrame, local: Point) -> Option<FillId> {
        let ids: Vec<FillId> = self.designs.get(design)?.fills.iter().rev().map(|f| f.id).collect();
        ids.into_iter()
            .find(|id| self.render_fill(design, tile, *id).is_some_and(|data| data.contains(local)))
    }

    pub fn delete_fill_at_point(&mut self, design: DesignId, tile: &TileFrame, local: Point) -> Option<FillRegion> {
        let id = self.fill_at_point(design, tile, local)?;
        let idx = self.designs[design].fill_index(id)?;
        self.cache.remove(id);
        Some(self.designs[design].fills.remove(idx))
    }

    /// Topmost stroke within the hit tolerance of a tile-local point.
    pub fn ink_at_point(&self, design: DesignId, tile: &TileFrame, local: Point) -> Option<InkId> {
        let tolerance = self.config.ink_hit_tolerance * self.config.render_scale;
        self.designs
            .get(design)?
            .ink
            .iter()
            .rev()
            .find(|ink| ink_hit(&ink.to_local(tile.side()), local, tolerance))
            .map(|ink| ink.id)
    }

    /// Delete the stroke under a point, or failing that the fill under it.
    pub fn delete_at_point(&mut self, design: DesignId, tile: &TileFrame, local: Point) -> Option<Deleted> {
        if let Some(id) = self.ink_at_point(design, tile, local) {
            return self.delete_ink(design, tile, id).ok().map(Deleted::Ink);
        }
        self.delete_fill_at_point(design, tile, local).map(Deleted::Fill)
    }

    pub fn set_render_scale(&mut self, scale: f64) {
        if scale != self.config.render_scale {
            self.config.render_scale = scale;
            self.cache.bump_geometry_revision();
        }
    }

    /// Tile size or polygon changed; every cached fill is recomputed.
    pub fn notify_geometry_changed(&mut self) {
        self.cache.bump_geometry_revision();
    }

    /// Drop fills an ink edit invalidated. A fill goes when a boundary id
    /// was deleted, when its seed no longer yields a region, or when one of
    /// its boundary strokes changed and ink alone no longer encloses it.
    fn prune_fills(&mut self, design: DesignId, tile: &TileFrame, changed: &[InkId], deleted: &[InkId]) {
        let fills = std::mem::take(&mut self.designs[design].fills);
        let mut kept = Vec::with_capacity(fills.len());

        for mut fill in fills {
            let current = &self.designs[design];
            if fill.boundary_ink_ids.is_none()
                && render(&mut self.cache, &mut fill, tile, current, &self.config).is_none()
            {
                self.drop_fill(&fill, "seed no longer valid");
                continue;
            }

            let ids = fill.boundary_ink_ids.clone().unwrap_or_default();
            if ids.iter().any(|id| deleted.contains(id)) {
                self.drop_fill(&fill, "boundary ink deleted");
                continue;
            }
            let boundary_changed = ids.iter().any(|id| changed.contains(id));
            if !changed.is_empty() && !boundary_changed {
                kept.push(fill);
                continue;
            }

            match render(&mut self.cache, &mut fill, tile, current, &self.config) {
                None => self.drop_fill(&fill, "seed no longer valid"),
                Some(data) if boundary_changed && !data.closed_by_ink => {
                    self.drop_fill(&fill, "no longer closed by ink")
                }
                Some(_) => kept.push(fill),
            }
        }
        self.designs[design].fills = kept;
    }

    fn drop_fill(&mut self, fill: &FillRegion, reason: &str) {
        log::debug!("pruning fill {}: {reason}", fill.id);
        self.cache.remove(fill.id);
    }
}

fn ink_hit(primitive: &Primitive, p: Point, tolerance: f64) -> bool {
    match *primitive {
        Primitive::Line { a, b } => point_to_segment_dist(p, a, b) <= tolerance,
        Primitive::Circle { c, r } => ((p - c).hypot() - r).abs() <= tolerance,
        Primitive::Arc { c, r, a0, a1 } => {
            ((p - c).hypot() - r).abs() <= tolerance && angle_in_arc(angle_of(c, p), a0, a1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn square() -> TileFrame {
        TileFrame::new(TileShape::Square, 100.0)
    }

    fn x_store() -> (DesignStore, DesignId, InkId, InkId) {
        let mut store = DesignStore::default();
        let d = store.add_design(TileShape::Square);
        let a = store
            .add_ink(d, Primitive::line(Point::new(-0.5, -0.5), Point::new(0.5, 0.5)))
            .unwrap();
        let b = store
            .add_ink(d, Primitive::line(Point::new(0.5, -0.5), Point::new(-0.5, 0.5)))
            .unwrap();
        (store, d, a, b)
    }

    #[test]
    fn test_ink_ids_are_global() {
        let mut store = DesignStore::default();
        let tri = store.add_design(TileShape::Triangle);
        let sq = store.add_design(TileShape::Square);
        let a = store.add_ink(tri, Primitive::circle(Point::ZERO, 0.1)).unwrap();
        let b = store.add_ink(sq, Primitive::circle(Point::ZERO, 0.1)).unwrap();
        assert_ne!(a, b);
        let deleted = store.delete_ink(tri, &TileFrame::new(TileShape::Triangle, 100.0), a).unwrap();
        assert_eq!(deleted.id, a);
        let c = store.add_ink(tri, Primitive::circle(Point::ZERO, 0.2)).unwrap();
        assert!(c > b);
    }

    #[test]
    fn test_rejects_degenerate_and_unknown() {
        let mut store = DesignStore::default();
        let d = store.add_design(TileShape::Square);
        assert_eq!(
            store.add_ink(d, Primitive::circle(Point::ZERO, 0.0)),
            Err(DesignError::Degenerate)
        );
        assert_eq!(
            store.add_ink(5, Primitive::circle(Point::ZERO, 0.1)),
            Err(DesignError::UnknownDesign(5))
        );
        assert_eq!(
            store.delete_ink(d, &square(), 42).unwrap_err(),
            DesignError::UnknownInk(42)
        );
    }

    #[test]
    fn test_create_fill_invalid_seed_changes_nothing() {
        let (mut store, d, _, _) = x_store();
        let err = store.create_fill(d, &square(), Point::ZERO).unwrap_err();
        assert!(matches!(err, DesignError::Fill(_)));
        assert!(store.design(d).unwrap().fills.is_empty());
    }

    #[test]
    fn test_fill_and_hit_test() {
        let (mut store, d, a, b) = x_store();
        let tile = square();
        let top = store.create_fill(d, &tile, Point::new(0.0, -30.0)).unwrap();
        let right = store.create_fill(d, &tile, Point::new(30.0, 0.0)).unwrap();

        let fill = store.design(d).unwrap().get_fill(top).unwrap().clone();
        assert_eq!(fill.boundary_ink_ids, Some(vec![a, b]));
        assert!(fill.uses_tile_boundary);
        assert_eq!(fill.seed, Point::new(0.0, -0.3));

        assert_eq!(store.fill_at_point(d, &tile, Point::new(0.0, -40.0)), Some(top));
        assert_eq!(store.fill_at_point(d, &tile, Point::new(40.0, 0.0)), Some(right));
        assert_eq!(store.fill_at_point(d, &tile, Point::new(-40.0, 0.0)), None);

        let removed = store.delete_fill_at_point(d, &tile, Point::new(0.0, -40.0)).unwrap();
        assert_eq!(removed.id, top);
        assert_eq!(store.design(d).unwrap().fills.len(), 1);
    }

    #[test]
    fn test_ink_at_point_respects_arc_span() {
        let mut store = DesignStore::default();
        let d = store.add_design(TileShape::Square);
        let arc = store.add_ink(d, Primitive::arc(Point::ZERO, 0.3, 0.0, FRAC_PI_2)).unwrap();
        let tile = square();
        assert_eq!(store.ink_at_point(d, &tile, Point::new(30.0, 5.0)), Some(arc));
        assert_eq!(store.ink_at_point(d, &tile, Point::new(-30.0, 0.0)), None);
        assert_eq!(store.ink_at_point(d, &tile, Point::new(45.0, 0.0)), None);
    }

    #[test]
    fn test_delete_ink_prunes_dependent_fills() {
        let (mut store, d, a, _) = x_store();
        let tile = square();
        store.create_fill(d, &tile, Point::new(0.0, -30.0)).unwrap();
        let circle = store.add_ink(d, Primitive::circle(Point::new(0.3, 0.0), 0.05)).unwrap();
        let inner = store.create_fill(d, &tile, Point::new(30.0, 0.0)).unwrap();

        store.delete_ink(d, &tile, a).unwrap();
        let fills = &store.design(d).unwrap().fills;
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].id, inner);
        assert_eq!(fills[0].boundary_ink_ids, Some(vec![circle]));
    }

    #[test]
    fn test_update_ink_prunes_opened_fill() {
        let mut store = DesignStore::default();
        let d = store.add_design(TileShape::Square);
        let tile = square();
        let c = store.add_ink(d, Primitive::circle(Point::ZERO, 0.25)).unwrap();
        store.create_fill(d, &tile, Point::ZERO).unwrap();

        // Shrinking keeps the region enclosed.
        store.update_ink(d, &tile, c, Primitive::circle(Point::ZERO, 0.2)).unwrap();
        assert_eq!(store.design(d).unwrap().fills.len(), 1);

        // Opening the circle into an arc lets the region escape.
        store
            .update_ink(d, &tile, c, Primitive::arc(Point::ZERO, 0.2, 0.5, 5.5))
            .unwrap();
        assert!(store.design(d).unwrap().fills.is_empty());
    }

    #[test]
    fn test_render_scale_bumps_geometry_revision() {
        let mut store = DesignStore::default();
        store.set_render_scale(1.0);
        assert_eq!(store.cache().geometry_revision(), 0);
        store.set_render_scale(2.0);
        assert_eq!(store.cache().geometry_revision(), 1);
        assert_eq!(store.config().render_scale, 2.0);
    }

    #[test]
    fn test_full_turn_arc_is_stored_as_circle() {
        let mut store = DesignStore::default();
        let d = store.add_design(TileShape::Square);
        let id = store
            .add_ink(d, Primitive::arc(Point::ZERO, 0.25, 0.0, std::f64::consts::TAU))
            .unwrap();
        assert_eq!(
            store.design(d).unwrap().ink[0],
            InkPrimitive::new(id, Primitive::circle(Point::ZERO, 0.25))
        );
        let fill = store.create_fill(d, &square(), Point::ZERO).unwrap();
        assert_eq!(
            store.design(d).unwrap().get_fill(fill).unwrap().boundary_ink_ids,
            Some(vec![id])
        );
    }

    #[test]
    fn test_geometry_change_invalidates_cached_fill() {
        let (mut store, d, _, _) = x_store();
        let tile = square();
        let fill = store.create_fill(d, &tile, Point::new(0.0, -30.0)).unwrap();
        let first = store.render_fill(d, &tile, fill).unwrap();
        let again = store.render_fill(d, &tile, fill).unwrap();
        assert!(Rc::ptr_eq(&first, &again));

        store.notify_geometry_changed();
        assert_eq!(store.cache().geometry_revision(), 1);
        assert!(store.cache().is_empty());
        let fresh = store.render_fill(d, &tile, fill).unwrap();
        assert!(!Rc::ptr_eq(&first, &fresh));
        assert_eq!(fresh.signature, first.signature);
    }

    #[test]
    fn test_add_ink_stops_when_ids_run_out() {
        let mut design = Design::new(TileShape::Square);
        design
            .ink
            .push(InkPrimitive::new(InkId::MAX - 1, Primitive::circle(Point::ZERO, 0.1)));
        let mut store = DesignStore::from_designs(vec![design], FillConfig::default());
        assert_eq!(store.add_ink(0, Primitive::circle(Point::ZERO, 0.2)), Ok(InkId::MAX));
        assert_eq!(
            store.add_ink(0, Primitive::circle(Point::ZERO, 0.3)),
            Err(DesignError::InkIdsExhausted)
        );
        assert_eq!(store.next_ink_id(), None);
        assert_eq!(store.designs()[0].ink_ids(), vec![InkId::MAX - 1, InkId::MAX]);
    }

    #[test]
    fn test_delete_at_point_prefers_ink() {
        let (mut store, d, a, _) = x_store();
        let tile = square();
        store.create_fill(d, &tile, Point::new(0.0, -30.0)).unwrap();
        match store.delete_at_point(d, &tile, Point::new(20.0, 20.0)) {
            Some(Deleted::Ink(ink)) => assert_eq!(ink.id, a),
            other => panic!("unexpected {other:?}"),
        }
        assert!(store.design(d).unwrap().fills.is_empty());
        assert!(store.delete_at_point(d, &tile, Point::new(0.0, -30.0)).is_none());
    }
}
