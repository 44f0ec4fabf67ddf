use tracing::{debug, info};

use crate::error::Result;
use crate::graph::remap::IdMap;
use crate::graph::SpliceGraph;

/// What a merge added to the receiving graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub new_vertices: usize,
    pub shared_vertices: usize,
    pub new_edges: usize,
    pub new_transcripts: usize,
}

impl SpliceGraph {
    /// Merge `other` into this graph.
    ///
    /// Locations are joined on (chrom, coord, strand). Matched vertices of
    /// `other` take the id already used here; unmatched ones get fresh ids
    /// following `other`'s row order. One id map then rewrites every table of
    /// `other` before the union, and the result is renumbered by genomic
    /// position with roles recomputed.
    ///
    /// Transcript rows are unioned on `(tid, gid, gname, path)`: a row seen
    /// in both graphs is stored once, a known tid with another path is a new
    /// row. An edge pair already stored keeps its first type.
    ///
    /// Dataset names and both graphs' invariants are checked before anything
    /// is touched. A failure after that leaves `self` in an unspecified state.
    pub fn merge(&mut self, other: SpliceGraph) -> Result<MergeStats> {
        for name in other.datasets() {
            self.provenance.check_new_name(name)?;
        }
        self.tables.validate()?;
        other.tables.validate()?;

        let SpliceGraph {
            tables: incoming,
            provenance: incoming_prov,
            abundance: incoming_abundance,
            ..
        } = other;

        let mut stats = MergeStats::default();
        let mut map = IdMap::new();
        let mut next = self.tables.locations.next_id();
        for loc in incoming.locations.iter() {
            let key = loc.key();
            match self.tables.locations.lookup(&key) {
                Some(id) => {
                    map.insert(loc.vertex_id, id);
                    stats.shared_vertices += 1;
                }
                None => {
                    self.tables.locations.insert_with_id(next, key)?;
                    map.insert(loc.vertex_id, next);
                    next += 1;
                    stats.new_vertices += 1;
                }
            }
        }
        debug!(
            "joined locations: {} shared, {} new",
            stats.shared_vertices, stats.new_vertices
        );

        let incoming = incoming.remap(&map)?;
        let incoming_prov = incoming_prov.remap(&map)?;

        for e in incoming.edges.iter() {
            if self.tables.edges.add(*e)? {
                stats.new_edges += 1;
            }
        }
        for t in incoming.transcripts.iter() {
            if self.tables.transcripts.insert(t.clone()) {
                stats.new_transcripts += 1;
            }
        }

        let names = incoming_prov.datasets().join(", ");
        self.provenance.absorb(incoming_prov)?;
        self.abundance.extend(incoming_abundance);

        self.order_by_position()?;
        self.relabel()?;
        self.validate()?;

        info!(
            "merged [{}]: +{} vertices ({} shared), +{} edges, +{} transcripts",
            names, stats.new_vertices, stats.shared_vertices, stats.new_edges, stats.new_transcripts
        );
        Ok(stats)
    }
}
