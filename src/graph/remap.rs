use std::collections::HashMap;

use crate::error::{GraphError, Result};
use crate::graph::location::LocationTable;
use crate::model::types::VertexId;

/// Old vertex id -> new vertex id.
///
/// Every table that stores vertex ids (locations, edges, paths, dataset
/// presence) is rewritten through the same map, and lookups are strict:
/// an id missing from the map is an error, never passed through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    map: HashMap<VertexId, VertexId>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I: IntoIterator<Item = (VertexId, VertexId)>>(pairs: I) -> Self {
        Self {
            map: pairs.into_iter().collect(),
        }
    }

    /// Dense ids `[0, N)` following genomic order: chromosome (as text),
    /// then coordinate, then strand.
    pub fn ordered_by_position(locations: &LocationTable) -> Self {
        let mut order: Vec<_> = locations
            .iter()
            .map(|l| (l.key(), l.vertex_id))
            .collect();
        order.sort();
        Self::from_pairs(order.into_iter().enumerate().map(|(new, (_, old))| (old, new)))
    }

    pub fn insert(&mut self, old: VertexId, new: VertexId) {
        self.map.insert(old, new);
    }

    pub fn get(&self, old: VertexId) -> Option<VertexId> {
        self.map.get(&old).copied()
    }

    /// Mapped id, or `InvalidPath` naming `context` if `old` is unmapped.
    pub fn apply(&self, old: VertexId, context: &str) -> Result<VertexId> {
        self.get(old).ok_or_else(|| {
            GraphError::invalid_path(context, format!("vertex {old} has no entry in the id map"))
        })
    }

    pub fn apply_path(&self, path: &[VertexId], tid: &str) -> Result<Vec<VertexId>> {
        path.iter().map(|&v| self.apply(v, tid)).collect()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.map.iter().all(|(k, v)| k == v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strand;

    #[test]
    fn ordered_by_position_sorts_chrom_then_coord() {
        let mut locs = LocationTable::new();
        locs.intern("chr3", 20, Strand::Plus);
        locs.intern("chr1", 500, Strand::Plus);
        locs.intern("chr1", 20, Strand::Plus);

        let map = IdMap::ordered_by_position(&locs);
        assert_eq!(map, IdMap::from_pairs([(2, 0), (1, 1), (0, 2)]));
    }

    #[test]
    fn apply_path_preserves_order() {
        let map = IdMap::from_pairs([(0, 6), (1, 5), (2, 7)]);
        assert_eq!(map.apply_path(&[0, 1, 2], "t").unwrap(), vec![6, 5, 7]);
        assert_eq!(map.apply_path(&[0, 2], "t").unwrap(), vec![6, 7]);
    }

    #[test]
    fn unmapped_vertex_is_an_error() {
        let map = IdMap::from_pairs([(0, 1)]);
        let err = map.apply_path(&[0, 9], "T1").unwrap_err();
        assert!(matches!(err, GraphError::InvalidPath { ref tid, .. } if tid == "T1"));
    }

    #[test]
    fn identity_detection() {
        assert!(IdMap::from_pairs([(0, 0), (1, 1)]).is_identity());
        assert!(!IdMap::from_pairs([(0, 1), (1, 0)]).is_identity());
    }
}
