//! gtf_splice_graph
//!
//! Splice graphs built from GTF/GFF3 transcript annotations. Exon boundaries
//! become shared vertices, exon and intron segments become directed edges,
//! and every transcript is a path through the graph. Several datasets can be
//! merged into one graph while remembering which dataset contributed each
//! vertex, edge and transcript.

pub mod annotation;
pub mod error;
pub mod graph;
pub mod model;
pub mod types;

pub use error::{GraphError, Result};

pub use annotation::{
    read_abundance, AbundanceOptions, AbundanceTable, AnnotationBuilder, AnnotationSource,
    GtfSource, IdNameKeys, ParseError,
};

pub use graph::{MergeStats, SpliceDiGraph, SpliceGraph, ANNOTATION_DATASET};

pub use types::{Exon, Strand};

pub use model::gene::Gene;
pub use model::transcript::TranscriptRecord;
pub use model::types::{EdgeId, EdgeType, NodeRoles, VertexId};
