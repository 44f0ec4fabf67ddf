use serde::{Deserialize, Serialize};

use crate::types::{Exon, Strand};

/// One transcript as delivered by an annotation source: identifiers plus
/// its exon blocks. This is the raw record the graph is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub tid: String,
    pub gid: String,
    pub gname: String,
    pub chrom: String,
    pub strand: Strand,
    exons: Vec<Exon>,
    finalized: bool,
}

impl TranscriptRecord {
    pub fn new(
        tid: impl Into<String>,
        gid: impl Into<String>,
        gname: impl Into<String>,
        chrom: impl Into<String>,
        strand: Strand,
    ) -> Self {
        Self {
            tid: tid.into(),
            gid: gid.into(),
            gname: gname.into(),
            chrom: chrom.into(),
            strand,
            exons: Vec::new(),
            finalized: false,
        }
    }

    /// Builder-style helper, mostly for tests and in-memory sources.
    /// Blocks are `(start, end)` in 1-based inclusive coordinates.
    ///
    /// # Panics
    ///
    /// If any block has `start > end`.
    pub fn with_exons(mut self, exons: &[(u32, u32)]) -> Self {
        for &(s, e) in exons {
            self.add_exon(Exon::new(s, e));
        }
        self.finalize();
        self
    }

    pub fn add_exon(&mut self, exon: Exon) {
        self.exons.push(exon);
        self.finalized = false;
    }

    /// Exons sorted by genomic start (not transcription order).
    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Sort and merge exons. Returns the genomic span (start, end), or
    /// `None` when the transcript has no exons.
    pub fn finalize(&mut self) -> Option<(u32, u32)> {
        let exons = std::mem::take(&mut self.exons);
        self.exons = Exon::merge_sorted(exons);
        self.finalized = true;
        self.span()
    }

    pub fn span(&self) -> Option<(u32, u32)> {
        let first = self.exons.first()?;
        let last = self.exons.last()?;
        Some((first.start, last.end))
    }

    /// Exons in transcription order: ascending on `+`, descending on `-`.
    pub fn exons_in_transcription_order(&self) -> Vec<Exon> {
        let mut out = self.exons.clone();
        if self.strand.is_reverse() {
            out.reverse();
        }
        out
    }

    /// Boundary coordinates in transcription order, two per exon.
    pub fn boundary_coords(&self) -> Vec<u32> {
        self.exons_in_transcription_order()
            .into_iter()
            .flat_map(|e| {
                let (a, b) = e.boundaries(self.strand);
                [a, b]
            })
            .collect()
    }
}
