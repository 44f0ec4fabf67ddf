use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::annotation::io::{AnnotationReader, AnnotationRecord, ParseError};
use crate::model::transcript::TranscriptRecord;
use crate::types::Exon;

/// Which attribute keys identify genes and transcripts.
///
/// Several keys may be given per category; the first one present wins.
/// GFF3 `Parent` values are split on ',' and each parent is treated as a
/// transcript id.
#[derive(Debug, Clone)]
pub struct IdNameKeys {
    pub gene_id_keys: Vec<String>,
    pub gene_name_keys: Vec<String>,
    pub transcript_id_keys: Vec<String>,

    /// GFF3 exon->transcript linkage (most commonly: Parent)
    pub parent_keys: Vec<String>,

    /// Feature types that count as exon blocks (default: ["exon"])
    pub exon_feature_types: Vec<String>,
}

impl Default for IdNameKeys {
    fn default() -> Self {
        Self {
            gene_id_keys: vec!["gene_id".into()],
            gene_name_keys: vec!["gene_name".into(), "Name".into()],
            transcript_id_keys: vec!["transcript_id".into()],
            parent_keys: vec!["Parent".into()],
            exon_feature_types: vec!["exon".into()],
        }
    }
}

/// Groups the exon lines of a GTF/GFF3 file into [`TranscriptRecord`]s.
///
/// Transcripts come out in first-seen order, each with its exons sorted
/// and merged.
#[derive(Debug, Clone, Default)]
pub struct AnnotationBuilder {
    pub keys: IdNameKeys,
}

impl AnnotationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: IdNameKeys) -> Self {
        Self { keys }
    }

    pub fn gene_id_key(mut self, key: &str) -> Self {
        self.keys.gene_id_keys = vec![key.to_string()];
        self
    }

    pub fn gene_name_keys(mut self, keys: &[&str]) -> Self {
        self.keys.gene_name_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn transcript_id_keys(mut self, keys: &[&str]) -> Self {
        self.keys.transcript_id_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn parent_keys(mut self, keys: &[&str]) -> Self {
        self.keys.parent_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn exon_feature_types(mut self, types: &[&str]) -> Self {
        self.keys.exon_feature_types = types.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Read transcripts from anything implementing `BufRead`.
    pub fn build_from_reader<R: BufRead>(&self, reader: R) -> Result<Vec<TranscriptRecord>, ParseError> {
        let mut transcripts: Vec<TranscriptRecord> = Vec::new();
        let mut tid_to_row: HashMap<String, usize> = HashMap::new();

        for rec in AnnotationReader::new(reader).records() {
            let rec = rec?;
            if !rec.is_feature(&self.keys.exon_feature_types) {
                continue;
            }

            let gid = rec
                .pick_first_attr(&self.keys.gene_id_keys)
                .ok_or_else(|| ParseError::MissingAttribute {
                    line_no: rec.line_no,
                    tried: self.keys.gene_id_keys.clone(),
                })?;
            let gname = rec
                .pick_first_attr(&self.keys.gene_name_keys)
                .unwrap_or_else(|| gid.clone());

            for tid in self.transcript_keys(&rec)? {
                let row = *tid_to_row.entry(tid.clone()).or_insert_with(|| {
                    transcripts.push(TranscriptRecord::new(
                        tid.clone(),
                        gid.clone(),
                        gname.clone(),
                        rec.seqname.clone(),
                        rec.strand,
                    ));
                    transcripts.len() - 1
                });

                let tx = &mut transcripts[row];
                if tx.chrom != rec.seqname || tx.strand != rec.strand {
                    warn!(
                        "line {}: exon of {} on {}:{} disagrees with {}:{}; skipped",
                        rec.line_no, tid, rec.seqname, rec.strand, tx.chrom, tx.strand
                    );
                    continue;
                }
                tx.add_exon(Exon::new(rec.start, rec.end));
            }
        }

        for tx in &mut transcripts {
            tx.finalize();
        }
        debug!("grouped exon records into {} transcripts", transcripts.len());

        Ok(transcripts)
    }

    /// Read transcripts from a file; `.gz` files are decompressed on the fly.
    pub fn build_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<TranscriptRecord>> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("open annotation file {}", path.display()))?;

        let is_gz = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let reader: Box<dyn BufRead> = if is_gz {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        self.build_from_reader(reader)
            .with_context(|| format!("read transcripts from {}", path.display()))
    }

    fn transcript_keys(&self, rec: &AnnotationRecord) -> Result<Vec<String>, ParseError> {
        if let Some(tid) = rec.pick_first_attr(&self.keys.transcript_id_keys) {
            return Ok(vec![tid]);
        }
        let raw = rec.pick_first_attr(&self.keys.parent_keys).ok_or_else(|| {
            let mut tried = self.keys.transcript_id_keys.clone();
            tried.extend(self.keys.parent_keys.iter().cloned());
            ParseError::MissingAttribute {
                line_no: rec.line_no,
                tried,
            }
        })?;
        Ok(split_gff3_parent_list(&raw))
    }
}

/// Split a GFF3 Parent= list on commas.
fn split_gff3_parent_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
