use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{GraphError, Result};
use crate::graph::remap::IdMap;
use crate::model::types::{EdgeId, EdgeType, VertexId};
use crate::types::Strand;

/// One row of the edge table. Direction follows transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub v1: VertexId,
    pub v2: VertexId,
    pub edge_type: EdgeType,
    pub strand: Strand,
}

impl Edge {
    #[inline]
    pub fn id(&self) -> EdgeId {
        (self.v1, self.v2)
    }
}

/// Edges keyed by their directed vertex pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTable {
    rows: BTreeMap<EdgeId, Edge>,
}

impl EdgeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge or reuse the existing one.
    ///
    /// Returns `true` if the edge is new. A pair is stored with one type
    /// only: the first one seen wins and a later edge of the other type is
    /// dropped with a warning.
    pub fn add(&mut self, edge: Edge) -> Result<bool> {
        if edge.v1 == edge.v2 {
            return Err(GraphError::invalid_path(
                "<edges>",
                format!("self-loop on vertex {}", edge.v1),
            ));
        }
        match self.rows.get(&edge.id()) {
            Some(existing) => {
                if existing.edge_type != edge.edge_type {
                    warn!(
                        "edge ({}, {}) already recorded as {}; {} ignored",
                        edge.v1, edge.v2, existing.edge_type, edge.edge_type
                    );
                }
                Ok(false)
            }
            None => {
                self.rows.insert(edge.id(), edge);
                Ok(true)
            }
        }
    }

    pub fn get(&self, v1: VertexId, v2: VertexId) -> Option<&Edge> {
        self.rows.get(&(v1, v2))
    }

    pub fn contains(&self, v1: VertexId, v2: VertexId) -> bool {
        self.rows.contains_key(&(v1, v2))
    }

    /// Rows ordered by (v1, v2).
    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count_type(&self, edge_type: EdgeType) -> usize {
        self.rows.values().filter(|e| e.edge_type == edge_type).count()
    }

    pub(crate) fn retain(&mut self, keep: impl Fn(&EdgeId) -> bool) {
        self.rows.retain(|id, _| keep(id));
    }

    /// Rewrite both endpoints of every edge through `map`.
    pub fn remap(self, map: &IdMap) -> Result<Self> {
        let mut out = EdgeTable::new();
        for (_, edge) in self.rows {
            let v1 = map.apply(edge.v1, "<edges>")?;
            let v2 = map.apply(edge.v2, "<edges>")?;
            out.add(Edge { v1, v2, ..edge })?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exon(v1: VertexId, v2: VertexId) -> Edge {
        Edge {
            v1,
            v2,
            edge_type: EdgeType::Exon,
            strand: Strand::Plus,
        }
    }

    #[test]
    fn add_reuses_existing_pairs() {
        let mut t = EdgeTable::new();
        assert!(t.add(exon(0, 1)).unwrap());
        assert!(!t.add(exon(0, 1)).unwrap());
        assert!(t.add(exon(1, 0)).unwrap());
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn first_type_wins_on_conflict() {
        let mut t = EdgeTable::new();
        t.add(exon(0, 1)).unwrap();
        let intron = Edge {
            edge_type: EdgeType::Intron,
            ..exon(0, 1)
        };
        assert!(!t.add(intron).unwrap());
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(0, 1).unwrap().edge_type, EdgeType::Exon);
        assert_eq!(t.count_type(EdgeType::Intron), 0);
    }

    #[test]
    fn self_loops_are_rejected() {
        let mut t = EdgeTable::new();
        assert!(t.add(exon(3, 3)).is_err());
    }

    #[test]
    fn remap_rewrites_endpoints() {
        let mut t = EdgeTable::new();
        t.add(exon(0, 1)).unwrap();
        t.add(exon(1, 2)).unwrap();
        t.add(exon(0, 2)).unwrap();

        let map = IdMap::from_pairs([(2, 0), (1, 1), (0, 2)]);
        let t = t.remap(&map).unwrap();

        assert!(t.contains(2, 1));
        assert!(t.contains(1, 0));
        assert!(t.contains(2, 0));
        assert_eq!(t.len(), 3);
    }
}
