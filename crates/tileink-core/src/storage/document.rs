//! Saved document schema and tolerant loading.

use super::{StorageError, StorageResult};
use crate::config::FillConfig;
use crate::design::{Design, FillRegion};
use crate::geometry::Primitive;
use crate::ink::{InkId, InkPrimitive};
use crate::store::DesignStore;
use crate::tile::TileShape;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Value of the `app` field written to every document.
pub const APP_NAME: &str = "tile-designer";

/// Schema version written to every document.
pub const DOCUMENT_VERSION: u32 = 2;

/// A persisted fill. The seed is in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillRecord {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_ink_ids: Option<Vec<InkId>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub uses_tile_boundary: bool,
}

impl FillRecord {
    fn from_region(fill: &FillRegion) -> Self {
        Self {
            x: fill.seed.x,
            y: fill.seed.y,
            boundary_ink_ids: fill.boundary_ink_ids.clone(),
            uses_tile_boundary: fill.uses_tile_boundary,
        }
    }
}

/// A persisted design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignRecord {
    pub shape: TileShape,
    pub ink: Vec<InkPrimitive>,
    pub fills: Vec<FillRecord>,
}

/// The saved document: every design of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDocument {
    pub app: String,
    pub version: u32,
    pub designs: Vec<DesignRecord>,
}

impl Default for TileDocument {
    fn default() -> Self {
        Self {
            app: APP_NAME.to_string(),
            version: DOCUMENT_VERSION,
            designs: Vec::new(),
        }
    }
}

impl TileDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the designs of a store.
    pub fn from_store(store: &DesignStore) -> Self {
        let designs = store
            .designs()
            .iter()
            .map(|d| DesignRecord {
                shape: d.shape,
                ink: d.ink.clone(),
                fills: d.fills.iter().map(FillRecord::from_region).collect(),
            })
            .collect();
        Self {
            designs,
            ..Self::default()
        }
    }

    /// Rebuild a store. Fills get fresh ids; boundary data is kept as saved.
    pub fn into_store(self, config: FillConfig) -> DesignStore {
        let designs = self
            .designs
            .into_iter()
            .map(|record| Design {
                shape: record.shape,
                ink: record.ink,
                fills: record
                    .fills
                    .into_iter()
                    .map(|f| FillRegion {
                        id: 0,
                        seed: Point::new(f.x, f.y),
                        boundary_ink_ids: f.boundary_ink_ids,
                        uses_tile_boundary: f.uses_tile_boundary,
                    })
                    .collect(),
            })
            .collect();
        DesignStore::from_designs(designs, config)
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and sanitize a document.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| StorageError::Serialization(format!("Invalid JSON: {e}")))?;
        Self::from_value(&value)
    }

    /// Sanitize a parsed document.
    ///
    /// Malformed ink and fills are skipped, ink ids that are missing or
    /// already taken are reallocated and fills follow the new ids. Designs
    /// may be an array of `{shape, ink, fills}`, an object keyed by shape, or
    /// a bare top-level `ink`/`fills` pair for `tileShape`.
    pub fn from_value(value: &Value) -> StorageResult<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| StorageError::Serialization("Document is not an object".to_string()))?;
        match root.get("app").and_then(Value::as_str) {
            Some(APP_NAME) | None => {}
            Some(app) => log::warn!("loading document written by '{app}'"),
        }

        let mut ids = IdSanitizer::default();
        let designs = raw_designs(value, root)
            .into_iter()
            .map(|(shape, raw)| ids.design(shape, raw))
            .collect();
        Ok(Self {
            designs,
            ..Self::default()
        })
    }
}

fn raw_designs<'a>(value: &'a Value, root: &'a Map<String, Value>) -> Vec<(TileShape, &'a Value)> {
    match root.get("designs").or_else(|| root.get("shapeDesigns")) {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| {
                let shape = entry.get("shape").and_then(Value::as_str).and_then(TileShape::from_name);
                if shape.is_none() {
                    log::warn!("skipping design without a known shape");
                }
                shape.map(|s| (s, entry))
            })
            .collect(),
        Some(Value::Object(by_shape)) => TileShape::ALL
            .into_iter()
            .filter_map(|shape| by_shape.get(shape.name()).map(|raw| (shape, raw)))
            .collect(),
        _ if root.contains_key("ink") || root.contains_key("fills") => {
            let shape = root
                .get("tileShape")
                .and_then(Value::as_str)
                .and_then(TileShape::from_name)
                .unwrap_or(TileShape::Square);
            vec![(shape, value)]
        }
        _ => Vec::new(),
    }
}

/// Finite number, also accepting numeric strings.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn ink_id(value: &Value) -> Option<InkId> {
    let n = number(value)?;
    (n.fract() == 0.0 && n >= 1.0 && n <= f64::from(InkId::MAX)).then_some(n as InkId)
}

fn point(value: &Value) -> Option<Point> {
    Some(Point::new(number(value.get("x")?)?, number(value.get("y")?)?))
}

fn primitive(raw: &Value) -> Option<Primitive> {
    let field = |name: &str| raw.get(name);
    match raw.get("type")?.as_str()? {
        "line" => Some(Primitive::line(point(field("a")?)?, point(field("b")?)?)),
        "circle" => {
            let r = number(field("r")?)?;
            (r > 0.0).then_some(Primitive::circle(point(field("c")?)?, r))
        }
        "arc" => {
            let r = number(field("r")?)?;
            if r <= 0.0 {
                return None;
            }
            let arc = Primitive::arc(point(field("c")?)?, r, number(field("a0")?)?, number(field("a1")?)?);
            Some(arc.normalized())
        }
        _ => None,
    }
}

/// Ink ids seen so far across the whole document.
struct IdSanitizer {
    taken: HashSet<InkId>,
    next: InkId,
}

impl Default for IdSanitizer {
    fn default() -> Self {
        Self {
            taken: HashSet::new(),
            next: 1,
        }
    }
}

impl IdSanitizer {
    /// Smallest free id at or after `next`, wrapping to the low range once
    /// the top is reached. `InkId::MAX` is never handed out so every kept id
    /// leaves room for the store's allocator.
    fn allocate(&mut self) -> Option<InkId> {
        let start = self.next.max(1);
        let id = (start..InkId::MAX)
            .chain(1..start)
            .find(|id| !self.taken.contains(id))?;
        self.next = id + 1;
        Some(id)
    }

    fn design(&mut self, shape: TileShape, raw: &Value) -> DesignRecord {
        let raw_ink = raw.get("ink").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
        let raw_fills = raw.get("fills").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();

        let mut ink = Vec::with_capacity(raw_ink.len());
        let mut id_map: HashMap<InkId, InkId> = HashMap::new();
        for entry in raw_ink {
            let Some(prim) = primitive(entry) else {
                log::warn!("dropping malformed {shape} ink entry");
                continue;
            };
            let old = entry.get("id").and_then(ink_id);
            let id = match old {
                Some(id) if id < InkId::MAX && !self.taken.contains(&id) => {
                    self.next = self.next.max(id + 1);
                    id
                }
                _ => match self.allocate() {
                    Some(id) => {
                        log::warn!("reassigning {shape} ink id {old:?} to {id}");
                        id
                    }
                    None => {
                        log::warn!("dropping {shape} ink {old:?}: no free ink ids");
                        continue;
                    }
                },
            };
            if let Some(old) = old {
                id_map.entry(old).or_insert(id);
            }
            self.taken.insert(id);
            ink.push(InkPrimitive::new(id, prim));
        }

        let valid: HashSet<InkId> = ink.iter().map(|i| i.id).collect();
        let fills = raw_fills
            .iter()
            .filter_map(|entry| {
                let fill = fill_record(entry, &valid, &id_map);
                if fill.is_none() {
                    log::warn!("dropping malformed {shape} fill entry");
                }
                fill
            })
            .collect();
        DesignRecord { shape, ink, fills }
    }
}

fn fill_record(raw: &Value, valid: &HashSet<InkId>, id_map: &HashMap<InkId, InkId>) -> Option<FillRecord> {
    let x = number(raw.get("x")?)?;
    let y = number(raw.get("y")?)?;
    let boundary_ink_ids = raw.get("boundaryInkIds").and_then(Value::as_array).and_then(|entries| {
        let mut ids = Vec::new();
        for id in entries.iter().filter_map(ink_id) {
            let mapped = id_map.get(&id).copied().unwrap_or(id);
            if valid.contains(&mapped) && !ids.contains(&mapped) {
                ids.push(mapped);
            }
        }
        if ids.is_empty() && !entries.is_empty() {
            log::warn!("fill at ({x}, {y}) lost its boundary ids; they will be rediscovered");
            return None;
        }
        Some(ids)
    });
    Some(FillRecord {
        x,
        y,
        boundary_ink_ids,
        uses_tile_boundary: raw.get("usesTileBoundary").and_then(Value::as_bool) == Some(true),
    })
}
