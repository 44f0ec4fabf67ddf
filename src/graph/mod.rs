//! The splice graph: location, edge and transcript tables with per-dataset
//! provenance, and the directed graph derived from them.

pub mod assemble;
pub mod edge;
pub mod location;
pub mod merge;
pub mod path;
pub mod provenance;
pub mod remap;
pub mod roles;
pub mod subset;

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::annotation::abundance::AbundanceTable;
use crate::annotation::source::AnnotationSource;
use crate::error::{GraphError, Result};
use crate::model::gene::Gene;
use crate::model::transcript::TranscriptRecord;
use crate::model::types::{EdgeId, EdgeType, NodeRoles, VertexId};

pub use assemble::{EdgeAttrs, SpliceDiGraph, VertexAttrs};
pub use edge::{Edge, EdgeTable};
pub use location::{LocKey, Location, LocationTable};
pub use merge::MergeStats;
pub use path::{PathBuilder, TranscriptPath, TranscriptTable};
pub use provenance::Provenance;
pub use remap::IdMap;

const MAGIC: &[u8; 4] = b"SPG1";
const VERSION_STR: &str = env!("CARGO_PKG_VERSION");

/// Name under which reference annotations are added.
pub const ANNOTATION_DATASET: &str = "annotation";

/// The three tables every vertex id lives in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphTables {
    pub locations: LocationTable,
    pub edges: EdgeTable,
    pub transcripts: TranscriptTable,
}

impl GraphTables {
    /// Build tables from transcript records. Vertex ids follow first-seen
    /// order; role flags are not set yet.
    ///
    /// Transcripts that cannot form a path (no exons, a 1-bp exon) are
    /// skipped with a warning; the rest of the dataset is kept.
    pub fn from_records(records: &[TranscriptRecord]) -> Result<Self> {
        let mut tables = GraphTables::default();
        let mut transcripts = Vec::with_capacity(records.len());
        let mut skipped = 0usize;
        {
            let mut builder = PathBuilder::new(&mut tables.locations, &mut tables.edges);
            for rec in records {
                match builder.build(rec) {
                    Ok(t) => transcripts.push(t),
                    Err(e @ GraphError::InvalidPath { .. }) => {
                        warn!("skipping transcript: {e}");
                        skipped += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        if skipped > 0 {
            warn!("skipped {} of {} transcripts without a valid path", skipped, records.len());
        }
        tables.transcripts = TranscriptTable::from_rows(transcripts);
        Ok(tables)
    }

    /// Rewrite every stored vertex id through `map`, in all three tables.
    pub fn remap(self, map: &IdMap) -> Result<Self> {
        Ok(Self {
            locations: self.locations.remap(map)?,
            edges: self.edges.remap(map)?,
            transcripts: self.transcripts.remap(map)?,
        })
    }

    /// Check density, edge endpoints and path/edge consistency.
    pub fn validate(&self) -> Result<()> {
        if !self.locations.is_dense() {
            return Err(GraphError::invalid_path(
                "<locations>",
                format!("vertex ids are not the dense range [0, {})", self.locations.len()),
            ));
        }
        for e in self.edges.iter() {
            if !self.locations.contains(e.v1) || !self.locations.contains(e.v2) {
                return Err(GraphError::invalid_path(
                    "<edges>",
                    format!("edge ({}, {}) references a missing vertex", e.v1, e.v2),
                ));
            }
        }
        for t in self.transcripts.iter() {
            if t.path.len() < 2 {
                return Err(GraphError::invalid_path(&t.tid, "path shorter than 2"));
            }
            if let Some(&v) = t.path.iter().find(|&&v| !self.locations.contains(v)) {
                return Err(GraphError::invalid_path(&t.tid, format!("vertex {v} missing")));
            }
            if let Some((v1, v2)) = t.edge_ids().find(|&(a, b)| !self.edges.contains(a, b)) {
                return Err(GraphError::invalid_path(&t.tid, format!("edge ({v1}, {v2}) missing")));
            }
        }
        Ok(())
    }
}

/// Splice graph of one or more datasets.
///
/// The tables are the source of truth. The directed graph is derived on
/// first access and dropped whenever the tables change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpliceGraph {
    tables: GraphTables,
    provenance: Provenance,
    abundance: BTreeMap<String, AbundanceTable>,

    #[serde(skip)]
    graph: OnceCell<SpliceDiGraph>,
}

impl SpliceGraph {
    /// An empty graph without datasets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a single-dataset graph. Vertex ids follow first-seen order.
    pub fn from_transcripts(dataset: &str, records: Vec<TranscriptRecord>) -> Result<Self> {
        let mut provenance = Provenance::new();
        provenance.add_dataset(dataset)?;

        let mut tables = GraphTables::from_records(&records)?;
        roles::label_roles(&mut tables.locations, &tables.transcripts)?;

        for t in tables.transcripts.iter() {
            provenance.mark_transcript(dataset, t)?;
            for &v in &t.path {
                provenance.mark_vertex(dataset, v)?;
            }
            for e in t.edge_ids() {
                provenance.mark_edge(dataset, e)?;
            }
        }

        debug!(
            "built dataset '{}': {} vertices, {} edges, {} transcripts",
            dataset,
            tables.locations.len(),
            tables.edges.len(),
            tables.transcripts.len()
        );

        Ok(Self {
            tables,
            provenance,
            abundance: BTreeMap::new(),
            graph: OnceCell::new(),
        })
    }

    /// Read a dataset from `source` and merge it into this graph.
    pub fn add_dataset<S: AnnotationSource>(&mut self, name: &str, source: S) -> Result<MergeStats> {
        self.provenance.check_new_name(name)?;
        let records = source.into_transcripts()?;
        info!("adding dataset '{}' with {} transcripts", name, records.len());
        let incoming = SpliceGraph::from_transcripts(name, records)?;
        self.merge(incoming)
    }

    /// Add a reference annotation under [`ANNOTATION_DATASET`].
    pub fn add_annotation<S: AnnotationSource>(&mut self, source: S) -> Result<MergeStats> {
        self.add_dataset(ANNOTATION_DATASET, source)
    }

    /// Left-join abundance onto the transcripts of `dataset`.
    /// Entries for transcripts the graph does not hold are dropped.
    pub fn attach_abundance(&mut self, dataset: &str, mut table: AbundanceTable) -> Result<()> {
        self.provenance.check(dataset)?;
        let before = table.len();
        table.retain_tids(|tid| self.tables.transcripts.get(tid).is_some());
        if table.len() < before {
            debug!(
                "dropped {} abundance rows for transcripts not in the graph",
                before - table.len()
            );
        }
        self.abundance.insert(dataset.to_string(), table);
        Ok(())
    }

    // -----------------------
    // Table access
    // -----------------------

    pub fn tables(&self) -> &GraphTables {
        &self.tables
    }

    pub fn locations(&self) -> &LocationTable {
        &self.tables.locations
    }

    pub fn edges(&self) -> &EdgeTable {
        &self.tables.edges
    }

    pub fn transcripts(&self) -> &TranscriptTable {
        &self.tables.transcripts
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn datasets(&self) -> &[String] {
        self.provenance.datasets()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.locations.is_empty()
    }

    pub fn genes(&self) -> Vec<Gene> {
        self.tables.transcripts.genes()
    }

    /// The derived directed graph, assembled on first use.
    pub fn graph(&self) -> Result<&SpliceDiGraph> {
        if let Some(g) = self.graph.get() {
            return Ok(g);
        }
        let g = assemble::assemble(
            &self.tables.locations,
            &self.tables.edges,
            &self.tables.transcripts,
            &self.provenance,
        )?;
        Ok(self.graph.get_or_init(|| g))
    }

    fn invalidate(&mut self) {
        self.graph = OnceCell::new();
    }

    pub fn validate(&self) -> Result<()> {
        self.tables.validate()
    }

    // -----------------------
    // Dataset / column queries
    // -----------------------

    pub fn has_dataset(&self, dataset: &str) -> bool {
        self.provenance.contains(dataset)
    }

    /// Fail with `DatasetNotFound` for the first unknown name.
    pub fn check_datasets<S: AsRef<str>>(&self, datasets: &[S]) -> Result<()> {
        datasets
            .iter()
            .try_for_each(|d| self.provenance.check(d.as_ref()))
    }

    pub fn has_abundance(&self, dataset: &str) -> bool {
        self.abundance.contains_key(dataset)
    }

    pub fn check_abundance<S: AsRef<str>>(&self, datasets: &[S]) -> Result<()> {
        for d in datasets {
            let d = d.as_ref();
            self.provenance.check(d)?;
            if !self.has_abundance(d) {
                return Err(GraphError::MissingAbundance(d.to_string()));
            }
        }
        Ok(())
    }

    /// Counts of `tid` in `dataset`; 0 when absent.
    pub fn counts(&self, dataset: &str, tid: &str) -> f64 {
        self.abundance
            .get(dataset)
            .and_then(|t| t.get(tid))
            .map_or(0.0, |a| a.counts)
    }

    /// TPM of `tid` in `dataset`; 0 when absent.
    pub fn tpm(&self, dataset: &str, tid: &str) -> f64 {
        self.abundance
            .get(dataset)
            .and_then(|t| t.get(tid))
            .map_or(0.0, |a| a.tpm)
    }

    /// Presence of every vertex in `dataset`, indexed by vertex id.
    pub fn vertex_presence(&self, dataset: &str) -> Result<Vec<bool>> {
        self.provenance.check(dataset)?;
        Ok(self
            .tables
            .locations
            .ids()
            .map(|v| self.provenance.has_vertex(dataset, v))
            .collect())
    }

    /// Presence of every edge in `dataset`, in edge-table order.
    pub fn edge_presence(&self, dataset: &str) -> Result<Vec<(EdgeId, bool)>> {
        self.provenance.check(dataset)?;
        Ok(self
            .tables
            .edges
            .iter()
            .map(|e| (e.id(), self.provenance.has_edge(dataset, e.id())))
            .collect())
    }

    /// Presence of every transcript row in `dataset`, in transcript-table order.
    pub fn transcript_presence(&self, dataset: &str) -> Result<Vec<(String, bool)>> {
        self.provenance.check(dataset)?;
        Ok(self
            .tables
            .transcripts
            .iter()
            .map(|t| (t.tid.clone(), self.provenance.has_transcript(dataset, t)))
            .collect())
    }

    // -----------------------
    // Annotation / novelty
    // -----------------------

    fn require_annotation(&self, what: &str) -> Result<()> {
        if self.has_dataset(ANNOTATION_DATASET) {
            Ok(())
        } else {
            Err(GraphError::MissingAnnotation(what.to_string()))
        }
    }

    pub fn is_annotated_vertex(&self, v: VertexId) -> Result<bool> {
        self.require_annotation("vertex annotation status")?;
        Ok(self.provenance.has_vertex(ANNOTATION_DATASET, v))
    }

    pub fn is_annotated_edge(&self, e: EdgeId) -> Result<bool> {
        self.require_annotation("edge annotation status")?;
        Ok(self.provenance.has_edge(ANNOTATION_DATASET, e))
    }

    /// True if the annotation has any row under `tid`.
    pub fn is_annotated_transcript(&self, tid: &str) -> Result<bool> {
        self.require_annotation("transcript annotation status")?;
        Ok(self.provenance.has_tid(ANNOTATION_DATASET, tid))
    }

    /// Transcript rows not present in the annotation. A row reusing an
    /// annotated tid with a different path counts as novel.
    pub fn novel_transcripts(&self) -> Result<Vec<&TranscriptPath>> {
        self.require_annotation("novel transcripts")?;
        Ok(self
            .tables
            .transcripts
            .iter()
            .filter(|t| !self.provenance.has_transcript(ANNOTATION_DATASET, t))
            .collect())
    }

    pub fn has_novelty(&self) -> Result<bool> {
        Ok(!self.novel_transcripts()?.is_empty())
    }

    // -----------------------
    // Roles
    // -----------------------

    pub fn roles(&self, v: VertexId) -> Option<NodeRoles> {
        self.tables.locations.get(v).map(|l| l.roles)
    }

    /// Roles computed from the transcripts of one gene only.
    ///
    /// The table flags are unions over all genes; this gives the
    /// gene-scoped view for consumers that need it.
    pub fn gene_roles(&self, gid: &str) -> Result<BTreeMap<VertexId, NodeRoles>> {
        let rows: Vec<&TranscriptPath> = self.tables.transcripts.rows_of_gene(gid).collect();
        if rows.is_empty() {
            return Err(GraphError::GeneNotFound(gid.to_string()));
        }
        Ok(roles::compute_roles(rows).into_iter().collect())
    }

    /// Recompute role flags over all transcripts.
    pub fn relabel(&mut self) -> Result<()> {
        roles::label_roles(&mut self.tables.locations, &self.tables.transcripts)?;
        self.invalidate();
        Ok(())
    }

    // -----------------------
    // Renumbering
    // -----------------------

    /// Rewrite every vertex id through `map`: locations, edges, paths and
    /// dataset presence move together.
    pub fn apply_id_map(&mut self, map: &IdMap) -> Result<()> {
        let tables = std::mem::take(&mut self.tables);
        let provenance = std::mem::take(&mut self.provenance);
        self.tables = tables.remap(map)?;
        self.provenance = provenance.remap(map)?;
        self.invalidate();
        Ok(())
    }

    /// Renumber vertices densely by genomic position.
    pub fn order_by_position(&mut self) -> Result<()> {
        let map = IdMap::ordered_by_position(&self.tables.locations);
        if map.is_identity() {
            return Ok(());
        }
        debug!("reordering {} vertices by genomic position", map.len());
        self.apply_id_map(&map)
    }

    // -----------------------
    // Persistence
    // -----------------------

    /// Serialize with a small header (magic + crate version) and a bincode payload.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let mut f = BufWriter::new(f);

        f.write_all(MAGIC)?;

        let v = VERSION_STR.as_bytes();
        let len = v.len() as u16;
        f.write_all(&len.to_le_bytes())?;
        f.write_all(v)?;

        let payload = bincode::serialize(self)?;
        f.write_all(&payload)?;
        f.flush()?;

        info!("saved graph to {}", path.display());
        Ok(())
    }

    /// Load a graph written by `save()`. Rejects wrong file types and version mismatches.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;

        let mut magic = [0u8; 4];
        f.read_exact(&mut magic)?;
        if &magic != MAGIC {
            bail!("Not a SpliceGraph file (bad magic)");
        }

        let mut len_buf = [0u8; 2];
        f.read_exact(&mut len_buf)?;
        let len = u16::from_le_bytes(len_buf) as usize;

        let mut ver_buf = vec![0u8; len];
        f.read_exact(&mut ver_buf)?;
        let file_version = std::str::from_utf8(&ver_buf)?;
        if file_version != VERSION_STR {
            bail!(
                "Graph version mismatch: file={}, binary={}",
                file_version,
                VERSION_STR
            );
        }

        let mut payload = Vec::new();
        f.read_to_end(&mut payload)?;
        let g: Self = bincode::deserialize(&payload)?;
        g.validate()
            .with_context(|| format!("validate graph loaded from {}", path.display()))?;

        info!("loaded graph from {}", path.display());
        Ok(g)
    }
}

/// Human-readable summary: table sizes, role counts and per-dataset
/// contributions. Meant for logs and the `stats` command.
impl fmt::Display for SpliceGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.tables;
        writeln!(
            f,
            "SpliceGraph: {} vertices, {} edges ({} exon, {} intron), {} transcripts, {} genes",
            t.locations.len(),
            t.edges.len(),
            t.edges.count_type(EdgeType::Exon),
            t.edges.count_type(EdgeType::Intron),
            t.transcripts.len(),
            self.genes().len()
        )?;

        let mut role_counts = NodeRoles::default().flags().map(|(name, _)| (name, 0usize));
        for loc in t.locations.iter() {
            for (count, (_, on)) in role_counts.iter_mut().zip(loc.roles.flags()) {
                if on {
                    count.1 += 1;
                }
            }
        }
        let roles: Vec<String> = role_counts
            .iter()
            .map(|(name, n)| format!("{name}={n}"))
            .collect();
        writeln!(f, "  roles: {}", roles.join(", "))?;

        for d in self.provenance.datasets() {
            writeln!(
                f,
                "  - {}: vertices={}, edges={}, transcripts={}, abundance={}",
                d,
                self.provenance.vertices_of(d).map_or(0, |s| s.len()),
                self.provenance.edges_of(d).map_or(0, |s| s.len()),
                self.provenance.transcripts_of(d).map_or(0, |s| s.len()),
                if self.has_abundance(d) { "yes" } else { "no" }
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::abundance::AbundanceTable;
    use crate::annotation::source::GtfSource;
    use crate::types::Strand;
    use std::io::Cursor;

    fn rec(tid: &str, gid: &str, strand: Strand, exons: &[(u32, u32)]) -> TranscriptRecord {
        TranscriptRecord::new(tid, gid, gid, "chr1", strand).with_exons(exons)
    }

    #[test]
    fn built_graph_is_valid_and_labelled() {
        let g = SpliceGraph::from_transcripts(
            "annotation",
            vec![
                rec("t1", "g1", Strand::Plus, &[(1, 10), (20, 30)]),
                rec("t2", "g1", Strand::Plus, &[(1, 10)]),
            ],
        )
        .unwrap();

        g.validate().unwrap();
        // t1 -> [0, 1, 2, 3], t2 -> [0, 1]
        assert_eq!(g.transcripts().get("t2").unwrap().path, vec![0, 1]);
        let r0 = g.roles(0).unwrap();
        assert!(r0.tss && !r0.alt_tss);
        let r1 = g.roles(1).unwrap();
        assert!(r1.tes && r1.alt_tes && r1.internal);
        assert!(g.roles(3).unwrap().alt_tes);
        assert_eq!(g.vertex_presence("annotation").unwrap(), vec![true; 4]);
    }

    #[test]
    fn one_base_exon_skips_only_its_transcript() {
        let gtf = "\
chr1\tsrc\texon\t100\t200\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tsrc\texon\t300\t400\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tsrc\texon\t500\t500\t.\t+\t.\tgene_id \"G2\"; transcript_id \"T2\";
chr1\tsrc\texon\t600\t700\t.\t+\t.\tgene_id \"G3\"; transcript_id \"T3\";
";
        let mut g = SpliceGraph::new();
        g.add_dataset("annotation", GtfSource::new(Cursor::new(gtf.as_bytes())))
            .unwrap();

        assert_eq!(g.transcripts().len(), 2);
        assert!(g.transcripts().get("T1").is_some());
        assert!(g.transcripts().get("T2").is_none());
        assert!(g.transcripts().get("T3").is_some());
        // no vertex left behind at 500
        assert_eq!(g.locations().len(), 6);
        assert!(g.locations().iter().all(|l| l.coord != 500));
        g.validate().unwrap();
    }

    fn two_vertex_tables() -> GraphTables {
        let mut t = GraphTables::default();
        t.locations.intern("chr1", 1, Strand::Plus);
        t.locations.intern("chr1", 10, Strand::Plus);
        t
    }

    fn row(tid: &str, path: &[VertexId]) -> TranscriptPath {
        TranscriptPath {
            tid: tid.into(),
            gid: "g1".into(),
            gname: "g1".into(),
            path: path.to_vec(),
        }
    }

    fn exon_edge(v1: VertexId, v2: VertexId) -> Edge {
        Edge {
            v1,
            v2,
            edge_type: EdgeType::Exon,
            strand: Strand::Plus,
        }
    }

    #[test]
    fn validate_accepts_consistent_tables() {
        let mut t = two_vertex_tables();
        t.edges.add(exon_edge(0, 1)).unwrap();
        t.transcripts.insert(row("t1", &[0, 1]));
        t.validate().unwrap();
    }

    #[test]
    fn validate_rejects_gaps_in_vertex_ids() {
        let mut t = GraphTables::default();
        t.locations
            .insert_with_id(0, LocKey { chrom: "chr1".into(), coord: 1, strand: Strand::Plus })
            .unwrap();
        t.locations
            .insert_with_id(2, LocKey { chrom: "chr1".into(), coord: 10, strand: Strand::Plus })
            .unwrap();
        let err = t.validate().unwrap_err();
        assert!(matches!(err, GraphError::InvalidPath { ref reason, .. } if reason.contains("dense")));
    }

    #[test]
    fn validate_rejects_edge_to_missing_vertex() {
        let mut t = two_vertex_tables();
        t.edges.add(exon_edge(0, 5)).unwrap();
        let err = t.validate().unwrap_err();
        assert!(matches!(err, GraphError::InvalidPath { ref tid, .. } if tid == "<edges>"));
    }

    #[test]
    fn validate_rejects_short_path() {
        let mut t = two_vertex_tables();
        t.edges.add(exon_edge(0, 1)).unwrap();
        t.transcripts.insert(row("t1", &[0]));
        let err = t.validate().unwrap_err();
        assert!(matches!(err, GraphError::InvalidPath { ref tid, ref reason } if tid == "t1" && reason.contains("shorter")));
    }

    #[test]
    fn validate_rejects_path_through_unknown_vertex() {
        let mut t = two_vertex_tables();
        t.edges.add(exon_edge(0, 1)).unwrap();
        t.transcripts.insert(row("t1", &[0, 1, 7]));
        let err = t.validate().unwrap_err();
        assert!(matches!(err, GraphError::InvalidPath { ref reason, .. } if reason.contains("vertex 7")));
    }

    #[test]
    fn validate_rejects_path_pair_without_edge() {
        let mut t = two_vertex_tables();
        t.transcripts.insert(row("t1", &[0, 1]));
        let err = t.validate().unwrap_err();
        assert!(matches!(err, GraphError::InvalidPath { ref tid, ref reason } if tid == "t1" && reason.contains("(0, 1)")));
    }

    #[test]
    fn graph_view_is_cached_and_invalidated() {
        let mut g = SpliceGraph::from_transcripts(
            "a",
            vec![rec("t1", "g1", Strand::Minus, &[(1, 10), (20, 30)])],
        )
        .unwrap();
        assert_eq!(g.graph().unwrap().node_count(), 4);
        assert!(g.graph.get().is_some());

        g.order_by_position().unwrap();
        assert!(g.graph.get().is_none());
        // minus strand path runs 30 -> 20 -> 10 -> 1, positions reverse it
        assert_eq!(g.transcripts().get("t1").unwrap().path, vec![3, 2, 1, 0]);
        assert_eq!(g.graph().unwrap().edge_count(), 3);
    }

    #[test]
    fn dataset_queries() {
        let mut g = SpliceGraph::new();
        let gtf = "chr1\tsrc\texon\t1\t10\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n";
        g.add_dataset("sample1", GtfSource::new(Cursor::new(gtf.as_bytes())))
            .unwrap();

        g.check_datasets(&["sample1"]).unwrap();
        assert!(matches!(
            g.check_datasets(&["sample1", "sample2"]),
            Err(GraphError::DatasetNotFound(ref d)) if d == "sample2"
        ));
        assert!(matches!(
            g.check_abundance(&["sample1"]),
            Err(GraphError::MissingAbundance(_))
        ));

        g.attach_abundance(
            "sample1",
            AbundanceTable::from_counts(vec![("T1", 4.0), ("unknown", 4.0)]),
        )
        .unwrap();
        g.check_abundance(&["sample1"]).unwrap();
        assert_eq!(g.counts("sample1", "T1"), 4.0);
        assert_eq!(g.counts("sample1", "unknown"), 0.0);
        assert_eq!(g.tpm("sample1", "nope"), 0.0);
    }

    #[test]
    fn annotation_queries_need_an_annotation() {
        let g = SpliceGraph::from_transcripts(
            "sample1",
            vec![rec("t1", "g1", Strand::Plus, &[(1, 10)])],
        )
        .unwrap();
        assert!(matches!(g.has_novelty(), Err(GraphError::MissingAnnotation(_))));
        assert!(matches!(
            g.is_annotated_vertex(0),
            Err(GraphError::MissingAnnotation(_))
        ));
    }

    #[test]
    fn gene_roles_are_scoped_to_the_gene() {
        let g = SpliceGraph::from_transcripts(
            "a",
            vec![
                rec("a1", "g1", Strand::Plus, &[(1, 10)]),
                rec("b1", "g2", Strand::Plus, &[(1, 10)]),
                rec("b2", "g2", Strand::Plus, &[(5, 10)]),
            ],
        )
        .unwrap();
        // vertex 0 (coord 1) competes with coord 5 in g2 only
        assert!(g.roles(0).unwrap().alt_tss);
        assert!(!g.gene_roles("g1").unwrap()[&0].alt_tss);
        assert!(g.gene_roles("g2").unwrap()[&0].alt_tss);
        assert!(matches!(g.gene_roles("g3"), Err(GraphError::GeneNotFound(_))));
    }

    #[test]
    fn save_and_load_round_trip() {
        let g = SpliceGraph::from_transcripts(
            "annotation",
            vec![rec("t1", "g1", Strand::Plus, &[(1, 10), (20, 30)])],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.spg");
        g.save(&path).unwrap();

        let loaded = SpliceGraph::load(&path).unwrap();
        assert_eq!(loaded.tables(), g.tables());
        assert_eq!(loaded.provenance(), g.provenance());
        assert_eq!(loaded.graph().unwrap().node_count(), 4);
    }

    #[test]
    fn load_rejects_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_graph");
        std::fs::write(&path, b"XXXX0000").unwrap();
        assert!(SpliceGraph::load(&path).is_err());
    }

    #[test]
    fn display_lists_datasets() {
        let g = SpliceGraph::from_transcripts(
            "annotation",
            vec![rec("t1", "g1", Strand::Plus, &[(1, 10), (20, 30)])],
        )
        .unwrap();
        let s = g.to_string();
        assert!(s.starts_with("SpliceGraph: 4 vertices, 3 edges (2 exon, 1 intron), 1 transcripts, 1 genes"));
        assert!(s.contains("- annotation: vertices=4"));
    }
}
