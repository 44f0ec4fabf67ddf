//! Transcription start/end labelling of vertices.
//!
//! Full recomputation from the transcript table on every call.

use std::collections::{BTreeSet, HashMap};

use crate::error::{GraphError, Result};
use crate::graph::location::LocationTable;
use crate::graph::path::{TranscriptPath, TranscriptTable};
use crate::model::types::{NodeRoles, VertexId};

/// Roles of every vertex touched by `transcripts`.
///
/// `TSS`/`TES`/`internal` come from path positions. `alt_TSS`/`alt_TES` are
/// decided per gene: a gene with more than one transcript whose paths start
/// (end) at more than one vertex marks all of those vertices. The result is
/// the union across genes.
pub fn compute_roles<'a, I>(transcripts: I) -> HashMap<VertexId, NodeRoles>
where
    I: IntoIterator<Item = &'a TranscriptPath>,
{
    let mut roles: HashMap<VertexId, NodeRoles> = HashMap::new();
    let mut per_gene: HashMap<&str, Vec<&TranscriptPath>> = HashMap::new();

    for t in transcripts {
        if let Some(v) = t.first() {
            roles.entry(v).or_default().tss = true;
        }
        if let Some(v) = t.last() {
            roles.entry(v).or_default().tes = true;
        }
        for &v in t.inner() {
            roles.entry(v).or_default().internal = true;
        }
        per_gene.entry(t.gid.as_str()).or_default().push(t);
    }

    for paths in per_gene.values().filter(|p| p.len() > 1) {
        let starts: BTreeSet<VertexId> = paths.iter().filter_map(|t| t.first()).collect();
        if starts.len() > 1 {
            for v in starts {
                roles.entry(v).or_default().alt_tss = true;
            }
        }
        let ends: BTreeSet<VertexId> = paths.iter().filter_map(|t| t.last()).collect();
        if ends.len() > 1 {
            for v in ends {
                roles.entry(v).or_default().alt_tes = true;
            }
        }
    }

    roles
}

/// Reset and recompute the role flags of every location.
pub fn label_roles(locations: &mut LocationTable, transcripts: &TranscriptTable) -> Result<()> {
    let roles = compute_roles(transcripts.iter());

    for loc in locations.iter_mut() {
        loc.roles = NodeRoles::default();
    }
    for (v, r) in roles {
        let loc = locations.get_mut(v).ok_or_else(|| {
            GraphError::invalid_path("<roles>", format!("path vertex {v} missing from location table"))
        })?;
        loc.roles = r;
    }
    Ok(())
}
