use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::remap::IdMap;
use crate::model::types::{NodeRoles, VertexId};
use crate::types::Strand;

/// Hard identity of a vertex. Two observations with the same key are the
/// same vertex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocKey {
    pub chrom: String,
    pub coord: u32,
    pub strand: Strand,
}

/// One row of the location (vertex) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub vertex_id: VertexId,
    pub chrom: String,
    pub coord: u32,
    pub strand: Strand,
    pub roles: NodeRoles,
}

impl Location {
    pub fn key(&self) -> LocKey {
        LocKey {
            chrom: self.chrom.clone(),
            coord: self.coord,
            strand: self.strand,
        }
    }
}

/// Deduplicates (chrom, coord, strand) observations into vertex ids.
///
/// Ids are handed out in first-seen order. Strand is part of the key, so
/// the same coordinate on both strands yields two vertices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTable {
    rows: BTreeMap<VertexId, Location>,
    index: HashMap<LocKey, VertexId>,
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the given location, creating a vertex on first sight.
    pub fn intern(&mut self, chrom: &str, coord: u32, strand: Strand) -> VertexId {
        let key = LocKey {
            chrom: chrom.to_string(),
            coord,
            strand,
        };
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.next_id();
        self.insert_row(Location {
            vertex_id: id,
            chrom: key.chrom.clone(),
            coord,
            strand,
            roles: NodeRoles::default(),
        });
        id
    }

    /// Insert a location under an explicit id (merge engine only).
    pub(crate) fn insert_with_id(&mut self, id: VertexId, key: LocKey) -> Result<()> {
        if self.rows.contains_key(&id) || self.index.contains_key(&key) {
            return Err(GraphError::invalid_path(
                "<merge>",
                format!("vertex {id} ({}:{}:{}) already exists", key.chrom, key.coord, key.strand),
            ));
        }
        self.insert_row(Location {
            vertex_id: id,
            chrom: key.chrom,
            coord: key.coord,
            strand: key.strand,
            roles: NodeRoles::default(),
        });
        Ok(())
    }

    fn insert_row(&mut self, loc: Location) {
        self.index.insert(loc.key(), loc.vertex_id);
        self.rows.insert(loc.vertex_id, loc);
    }

    pub fn lookup(&self, key: &LocKey) -> Option<VertexId> {
        self.index.get(key).copied()
    }

    pub fn get(&self, id: VertexId) -> Option<&Location> {
        self.rows.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: VertexId) -> Option<&mut Location> {
        self.rows.get_mut(&id)
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Rows in ascending vertex-id order.
    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.rows.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Location> {
        self.rows.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.rows.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_id(&self) -> Option<VertexId> {
        self.rows.keys().next_back().copied()
    }

    /// Next fresh id: one past the current maximum.
    pub fn next_id(&self) -> VertexId {
        self.max_id().map_or(0, |m| m + 1)
    }

    /// True if ids are exactly `[0, N)`.
    pub fn is_dense(&self) -> bool {
        self.rows.keys().enumerate().all(|(i, &id)| i == id)
    }

    /// Keep only the given vertices (ids unchanged).
    pub(crate) fn retain(&mut self, keep: impl Fn(VertexId) -> bool) {
        self.rows.retain(|&id, _| keep(id));
        self.index.retain(|_, id| keep(*id));
    }

    /// Rewrite every vertex id through `map`. Every id must be mapped.
    pub fn remap(self, map: &IdMap) -> Result<Self> {
        let mut out = LocationTable::new();
        for (old, mut loc) in self.rows {
            let new = map.apply(old, "<locations>")?;
            loc.vertex_id = new;
            if out.rows.contains_key(&new) {
                return Err(GraphError::invalid_path(
                    "<locations>",
                    format!("id map sends two vertices to {new}"),
                ));
            }
            out.insert_row(loc);
        }
        Ok(out)
    }
}
