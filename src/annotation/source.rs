use std::io::BufRead;

use crate::annotation::builder::AnnotationBuilder;
use crate::error::Result;
use crate::model::transcript::TranscriptRecord;

/// Anything that can deliver the per-transcript exon records of one dataset.
///
/// The graph core only needs ordered exon blocks plus `tid`/`gid`/`gname`;
/// how they are produced (GTF text, a database query, a test fixture) is
/// up to the implementor.
pub trait AnnotationSource {
    fn into_transcripts(self) -> Result<Vec<TranscriptRecord>>;
}

impl AnnotationSource for Vec<TranscriptRecord> {
    fn into_transcripts(mut self) -> Result<Vec<TranscriptRecord>> {
        for tx in self.iter_mut().filter(|t| !t.is_finalized()) {
            tx.finalize();
        }
        Ok(self)
    }
}

/// GTF/GFF3 text read through an [`AnnotationBuilder`].
pub struct GtfSource<R: BufRead> {
    reader: R,
    builder: AnnotationBuilder,
}

impl<R: BufRead> GtfSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_builder(reader, AnnotationBuilder::default())
    }

    pub fn with_builder(reader: R, builder: AnnotationBuilder) -> Self {
        Self { reader, builder }
    }
}

impl<R: BufRead> AnnotationSource for GtfSource<R> {
    fn into_transcripts(self) -> Result<Vec<TranscriptRecord>> {
        Ok(self.builder.build_from_reader(self.reader)?)
    }
}
