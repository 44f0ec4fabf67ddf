use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::edge::{Edge, EdgeTable};
use crate::graph::location::LocationTable;
use crate::graph::remap::IdMap;
use crate::model::gene::Gene;
use crate::model::transcript::TranscriptRecord;
use crate::model::types::{EdgeType, VertexId};

/// One row of the transcript table: a transcript as a walk over vertices.
///
/// The whole row is the key. Two datasets reporting the same `tid` with
/// different paths give two rows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TranscriptPath {
    pub tid: String,
    pub gid: String,
    pub gname: String,
    pub path: Vec<VertexId>,
}

impl TranscriptPath {
    pub fn first(&self) -> Option<VertexId> {
        self.path.first().copied()
    }

    pub fn last(&self) -> Option<VertexId> {
        self.path.last().copied()
    }

    /// Vertices strictly between the first and the last.
    pub fn inner(&self) -> &[VertexId] {
        let n = self.path.len();
        if n <= 2 {
            return &self.path[0..0];
        }
        &self.path[1..n - 1]
    }

    /// Consecutive (v1, v2) pairs of the walk.
    pub fn edge_ids(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.path.windows(2).map(|w| (w[0], w[1]))
    }

    /// Same row with every vertex rewritten through `map`.
    pub fn remap(mut self, map: &IdMap) -> Result<Self> {
        self.path = map.apply_path(&self.path, &self.tid)?;
        Ok(self)
    }
}

/// Transcript rows in insertion order, one per distinct
/// `(tid, gid, gname, path)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTable {
    rows: Vec<TranscriptPath>,
    by_tid: HashMap<String, Vec<usize>>,
}

impl TranscriptTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<TranscriptPath>) -> Self {
        let mut t = Self::new();
        for row in rows {
            t.insert(row);
        }
        t
    }

    /// Insert a row. Returns `false` if an identical row is already present.
    pub fn insert(&mut self, row: TranscriptPath) -> bool {
        let slots = self.by_tid.entry(row.tid.clone()).or_default();
        if slots.iter().any(|&i| self.rows[i] == row) {
            return false;
        }
        slots.push(self.rows.len());
        self.rows.push(row);
        true
    }

    pub fn contains(&self, row: &TranscriptPath) -> bool {
        self.with_tid(&row.tid).any(|r| r == row)
    }

    /// First row recorded under `tid`.
    pub fn get(&self, tid: &str) -> Option<&TranscriptPath> {
        self.with_tid(tid).next()
    }

    /// Every row recorded under `tid`, in insertion order.
    pub fn with_tid<'a>(&'a self, tid: &str) -> impl Iterator<Item = &'a TranscriptPath> + 'a {
        self.by_tid
            .get(tid)
            .into_iter()
            .flatten()
            .map(move |&i| &self.rows[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranscriptPath> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Genes in first-seen order, each pointing at its transcript rows.
    pub fn genes(&self) -> Vec<Gene> {
        let mut order: Vec<Gene> = Vec::new();
        let mut by_gid: BTreeMap<&str, usize> = BTreeMap::new();
        for (row, t) in self.rows.iter().enumerate() {
            let gi = *by_gid.entry(t.gid.as_str()).or_insert_with(|| {
                order.push(Gene::new(t.gid.clone()));
                order.len() - 1
            });
            order[gi].add_name(&t.gname);
            order[gi].add_transcript(row);
        }
        for g in &mut order {
            g.finalize();
        }
        order
    }

    pub fn rows_of_gene<'a>(&'a self, gid: &'a str) -> impl Iterator<Item = &'a TranscriptPath> + 'a {
        self.rows.iter().filter(move |t| t.gid == gid)
    }

    /// Rewrite every path element through `map`. Row order is kept.
    pub fn remap(self, map: &IdMap) -> Result<Self> {
        let rows = self
            .rows
            .into_iter()
            .map(|t| t.remap(map))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rows,
            by_tid: self.by_tid,
        })
    }
}

/// Turns transcript records into vertex paths, creating locations and
/// edges on the way.
pub struct PathBuilder<'a> {
    locations: &'a mut LocationTable,
    edges: &'a mut EdgeTable,
}

impl<'a> PathBuilder<'a> {
    pub fn new(locations: &'a mut LocationTable, edges: &'a mut EdgeTable) -> Self {
        Self { locations, edges }
    }

    /// Walk the exons in transcription order. Each exon contributes its two
    /// boundary vertices; the segment inside an exon is an `exon` edge and
    /// the gap between consecutive exons an `intron` edge. A single-exon
    /// transcript yields a path of length 2.
    ///
    /// A transcript that would produce a self-loop (a 1-bp exon) is
    /// rejected before any location or edge is created.
    pub fn build(&mut self, rec: &TranscriptRecord) -> Result<TranscriptPath> {
        let coords = rec.boundary_coords();
        if coords.is_empty() {
            return Err(GraphError::invalid_path(&rec.tid, "transcript has no exons"));
        }
        if let Some(w) = coords.windows(2).find(|w| w[0] == w[1]) {
            return Err(GraphError::invalid_path(
                &rec.tid,
                format!("zero-length segment at {}:{}", rec.chrom, w[0]),
            ));
        }

        let mut path: Vec<VertexId> = Vec::with_capacity(coords.len());
        for (i, &coord) in coords.iter().enumerate() {
            let v = self.locations.intern(&rec.chrom, coord, rec.strand);
            if let Some(&prev) = path.last() {
                let edge_type = if i % 2 == 1 {
                    EdgeType::Exon
                } else {
                    EdgeType::Intron
                };
                self.edges.add(Edge {
                    v1: prev,
                    v2: v,
                    edge_type,
                    strand: rec.strand,
                })?;
            }
            path.push(v);
        }

        Ok(TranscriptPath {
            tid: rec.tid.clone(),
            gid: rec.gid.clone(),
            gname: rec.gname.clone(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strand;

    fn record(tid: &str, strand: Strand, exons: &[(u32, u32)]) -> TranscriptRecord {
        TranscriptRecord::new(tid, "G1", "Alpha", "chr1", strand).with_exons(exons)
    }

    #[test]
    fn two_exon_plus_transcript() {
        let mut locs = LocationTable::new();
        let mut edges = EdgeTable::new();
        let t = PathBuilder::new(&mut locs, &mut edges)
            .build(&record("T1", Strand::Plus, &[(100, 200), (300, 400)]))
            .unwrap();

        assert_eq!(t.path, vec![0, 1, 2, 3]);
        assert_eq!(locs.get(0).unwrap().coord, 100);
        assert_eq!(locs.get(3).unwrap().coord, 400);
        assert_eq!(edges.get(0, 1).unwrap().edge_type, EdgeType::Exon);
        assert_eq!(edges.get(1, 2).unwrap().edge_type, EdgeType::Intron);
        assert_eq!(edges.get(2, 3).unwrap().edge_type, EdgeType::Exon);
        assert_eq!(t.inner(), &[1, 2]);
    }

    #[test]
    fn minus_strand_edges_run_high_to_low() {
        let mut locs = LocationTable::new();
        let mut edges = EdgeTable::new();
        let t = PathBuilder::new(&mut locs, &mut edges)
            .build(&record("T1", Strand::Minus, &[(100, 200), (300, 400)]))
            .unwrap();

        let coords: Vec<u32> = t.path.iter().map(|&v| locs.get(v).unwrap().coord).collect();
        assert_eq!(coords, vec![400, 300, 200, 100]);
        assert!(edges.contains(t.path[0], t.path[1]));
        assert_eq!(edges.get(t.path[0], t.path[1]).unwrap().strand, Strand::Minus);
    }

    #[test]
    fn single_exon_transcript_has_length_two() {
        let mut locs = LocationTable::new();
        let mut edges = EdgeTable::new();
        let t = PathBuilder::new(&mut locs, &mut edges)
            .build(&record("T1", Strand::Plus, &[(100, 200)]))
            .unwrap();
        assert_eq!(t.path.len(), 2);
        assert!(t.inner().is_empty());
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn shared_boundaries_reuse_vertices_and_edges() {
        let mut locs = LocationTable::new();
        let mut edges = EdgeTable::new();
        let mut b = PathBuilder::new(&mut locs, &mut edges);
        b.build(&record("T1", Strand::Plus, &[(100, 200), (300, 400)])).unwrap();
        let t2 = b.build(&record("T2", Strand::Plus, &[(100, 200), (350, 400)])).unwrap();

        assert_eq!(t2.path, vec![0, 1, 4, 3]);
        assert_eq!(locs.len(), 5);
        assert_eq!(edges.len(), 5);
    }

    #[test]
    fn one_base_exon_is_rejected_without_side_effects() {
        let mut locs = LocationTable::new();
        let mut edges = EdgeTable::new();
        let err = PathBuilder::new(&mut locs, &mut edges)
            .build(&record("T1", Strand::Plus, &[(50, 60), (100, 100)]))
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidPath { .. }));
        assert!(locs.is_empty());
        assert!(edges.is_empty());
    }

    #[test]
    fn same_tid_with_another_path_is_a_second_row() {
        let row = TranscriptPath {
            tid: "T1".into(),
            gid: "G1".into(),
            gname: "Alpha".into(),
            path: vec![0, 1],
        };
        let mut t = TranscriptTable::new();
        assert!(t.insert(row.clone()));
        assert!(!t.insert(row.clone()));

        let other = TranscriptPath {
            path: vec![0, 2],
            ..row.clone()
        };
        assert!(t.insert(other.clone()));
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("T1"), Some(&row));
        assert_eq!(t.with_tid("T1").count(), 2);
        assert!(t.contains(&other));
        assert_eq!(t.with_tid("T9").count(), 0);
    }

    #[test]
    fn genes_group_rows_in_first_seen_order() {
        let rows = vec![
            TranscriptPath { tid: "a".into(), gid: "G2".into(), gname: "B".into(), path: vec![0, 1] },
            TranscriptPath { tid: "b".into(), gid: "G1".into(), gname: "A".into(), path: vec![2, 3] },
            TranscriptPath { tid: "c".into(), gid: "G2".into(), gname: "B".into(), path: vec![0, 4] },
        ];
        let t = TranscriptTable::from_rows(rows);
        let genes = t.genes();
        assert_eq!(genes.len(), 2);
        assert_eq!(genes[0].id, "G2");
        assert_eq!(genes[0].transcripts(), &[0, 2]);
        assert_eq!(genes[1].primary_name(), Some("A"));
    }
}
