use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{GraphError, Result};
use crate::graph::path::{TranscriptPath, TranscriptTable};
use crate::graph::{GraphTables, SpliceGraph};
use crate::model::types::{EdgeId, VertexId};

impl SpliceGraph {
    /// A new graph holding only the transcripts of gene `gid`.
    ///
    /// Keeps the vertices and edges those transcripts walk, renumbers them
    /// densely by genomic position and recomputes roles within the subset.
    /// Every dataset name is kept, even one that contributed nothing to the gene.
    pub fn subset_on_gene(&self, gid: &str) -> Result<SpliceGraph> {
        let rows: Vec<_> = self.tables.transcripts.rows_of_gene(gid).cloned().collect();
        if rows.is_empty() {
            return Err(GraphError::GeneNotFound(gid.to_string()));
        }

        let vertices: BTreeSet<VertexId> = rows.iter().flat_map(|t| t.path.iter().copied()).collect();
        let edges: BTreeSet<EdgeId> = rows.iter().flat_map(|t| t.edge_ids()).collect();
        let tids: BTreeSet<String> = rows.iter().map(|t| t.tid.clone()).collect();
        let kept: BTreeSet<TranscriptPath> = rows.iter().cloned().collect();

        let mut locations = self.tables.locations.clone();
        locations.retain(|v| vertices.contains(&v));
        let mut edge_table = self.tables.edges.clone();
        edge_table.retain(|e| edges.contains(e));

        let mut provenance = self.provenance.clone();
        provenance.restrict(
            |v| vertices.contains(&v),
            |e| edges.contains(e),
            |t| kept.contains(t),
        );

        let abundance = self
            .abundance
            .iter()
            .map(|(name, table)| {
                let mut table = table.clone();
                table.retain_tids(|t| tids.contains(t));
                (name.clone(), table)
            })
            .collect();

        let mut sub = SpliceGraph {
            tables: GraphTables {
                locations,
                edges: edge_table,
                transcripts: TranscriptTable::from_rows(rows),
            },
            provenance,
            abundance,
            graph: Default::default(),
        };
        sub.order_by_position()?;
        sub.relabel()?;
        sub.validate()?;

        debug!(
            "subset on gene {}: {} vertices, {} edges, {} transcripts",
            gid,
            sub.tables.locations.len(),
            sub.tables.edges.len(),
            sub.tables.transcripts.len()
        );
        Ok(sub)
    }
}

#[cfg(test)]
mod tests {
    use crate::annotation::abundance::AbundanceTable;
    use crate::error::GraphError;
    use crate::graph::SpliceGraph;
    use crate::model::transcript::TranscriptRecord;
    use crate::types::Strand;

    fn graph() -> SpliceGraph {
        let rec = |tid: &str, gid: &str, exons: &[(u32, u32)]| {
            TranscriptRecord::new(tid, gid, gid, "chr1", Strand::Plus).with_exons(exons)
        };
        let mut g = SpliceGraph::from_transcripts(
            "annotation",
            vec![
                rec("a1", "gA", &[(1, 10), (20, 30)]),
                rec("b1", "gB", &[(100, 110), (120, 130)]),
                rec("b2", "gB", &[(105, 110), (120, 130)]),
            ],
        )
        .unwrap();
        g.attach_abundance(
            "annotation",
            AbundanceTable::from_counts(vec![("a1", 1.0), ("b1", 3.0)]),
        )
        .unwrap();
        g
    }

    #[test]
    fn subset_renumbers_from_zero() {
        let sub = graph().subset_on_gene("gB").unwrap();
        assert_eq!(sub.locations().len(), 5);
        assert!(sub.locations().is_dense());
        assert_eq!(sub.locations().get(0).unwrap().coord, 100);
        assert_eq!(sub.transcripts().get("b1").unwrap().path, vec![0, 2, 3, 4]);
        assert_eq!(sub.transcripts().get("b2").unwrap().path, vec![1, 2, 3, 4]);
        assert!(sub.transcripts().get("a1").is_none());
        assert_eq!(sub.edges().len(), 4);
    }

    #[test]
    fn subset_keeps_roles_and_presence_local() {
        let sub = graph().subset_on_gene("gA").unwrap();
        assert!(!sub.roles(0).unwrap().alt_tss);
        assert!(sub.roles(0).unwrap().tss);
        assert_eq!(sub.vertex_presence("annotation").unwrap(), vec![true; 4]);
        assert_eq!(sub.counts("annotation", "a1"), 1.0);
        assert_eq!(sub.counts("annotation", "b1"), 0.0);
    }

    #[test]
    fn unknown_gene_is_an_error() {
        assert!(matches!(
            graph().subset_on_gene("gZ"),
            Err(GraphError::GeneNotFound(ref g)) if g == "gZ"
        ));
    }
}
