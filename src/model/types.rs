use std::fmt;

use serde::{Deserialize, Serialize};

/// Dense vertex identifier, `[0, N)` after every canonicalization pass.
pub type VertexId = usize;

/// Edges are keyed by their directed vertex pair `(v1, v2)`.
pub type EdgeId = (VertexId, VertexId);

/// Kind of segment an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    Exon,
    Intron,
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeType::Exon => "exon",
            EdgeType::Intron => "intron",
        };
        write!(f, "{s}")
    }
}

/// Transcript-structure roles of a vertex.
///
/// Flags are unions over all transcripts and genes: `alt_tss` means at
/// least one gene treats the vertex as one of several competing starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRoles {
    pub tss: bool,
    pub alt_tss: bool,
    pub tes: bool,
    pub alt_tes: bool,
    pub internal: bool,
}

impl NodeRoles {
    /// Each flag with its column name, in table order.
    pub fn flags(&self) -> [(&'static str, bool); 5] {
        [
            ("TSS", self.tss),
            ("alt_TSS", self.alt_tss),
            ("TES", self.tes),
            ("alt_TES", self.alt_tes),
            ("internal", self.internal),
        ]
    }
}

/// Column names of the location, edge and transcript tables.
/// Dataset names may not shadow any of these.
pub const RESERVED_COLUMNS: &[&str] = &[
    "chrom", "coord", "strand", "vertex_id", "TSS", "alt_TSS", "TES", "alt_TES", "internal",
    "edge_id", "v1", "v2", "edge_type", "tid", "gid", "gname", "path",
];
