use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Expression of one transcript in one dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Abundance {
    pub counts: f64,
    pub tpm: f64,
}

/// Which columns of an abundance TSV to use.
#[derive(Debug, Clone)]
pub struct AbundanceOptions {
    /// Column holding the transcript id.
    pub tid_col: String,
    /// Count columns summed per transcript (e.g. replicates of one dataset).
    pub count_cols: Vec<String>,
}

impl Default for AbundanceOptions {
    fn default() -> Self {
        Self {
            tid_col: "annot_transcript_id".into(),
            count_cols: Vec::new(),
        }
    }
}

/// Per-transcript abundance of one dataset, keyed by `tid`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbundanceTable {
    entries: HashMap<String, Abundance>,
}

impl AbundanceTable {
    /// Build from raw counts; TPM is counts / total * 1e6.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut entries: HashMap<String, Abundance> = HashMap::new();
        for (tid, c) in counts {
            entries.entry(tid.into()).or_default().counts += c;
        }

        let total: f64 = entries.values().map(|a| a.counts).sum();
        if total > 0.0 {
            for a in entries.values_mut() {
                a.tpm = a.counts / total * 1_000_000.0;
            }
        }
        Self { entries }
    }

    pub fn get(&self, tid: &str) -> Option<&Abundance> {
        self.entries.get(tid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the given transcripts.
    pub fn retain_tids(&mut self, keep: impl Fn(&str) -> bool) {
        self.entries.retain(|tid, _| keep(tid.as_str()));
    }
}

/// Read a tab-separated abundance file.
pub fn read_abundance<R: Read>(reader: R, opts: &AbundanceOptions) -> Result<AbundanceTable> {
    if opts.count_cols.is_empty() {
        return Err(GraphError::Configuration(
            "no count columns given for abundance file".into(),
        ));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            GraphError::Configuration(format!("abundance file has no column '{name}'"))
        })
    };
    let tid_idx = column(opts.tid_col.as_str())?;
    let count_idx: Vec<usize> = opts
        .count_cols
        .iter()
        .map(|c| column(c.as_str()))
        .collect::<Result<_>>()?;

    let mut counts: Vec<(String, f64)> = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let tid = row.get(tid_idx).unwrap_or_default().to_string();
        let mut total = 0.0;
        for &i in &count_idx {
            let raw = row.get(i).unwrap_or_default();
            total += raw.trim().parse::<f64>().map_err(|_| {
                GraphError::Configuration(format!(
                    "non-numeric count '{raw}' for transcript '{tid}'"
                ))
            })?;
        }
        counts.push((tid, total));
    }

    Ok(AbundanceTable::from_counts(counts))
}
