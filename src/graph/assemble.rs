use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{GraphError, Result};
use crate::graph::edge::EdgeTable;
use crate::graph::location::LocationTable;
use crate::graph::path::TranscriptTable;
use crate::graph::provenance::Provenance;
use crate::model::types::{EdgeType, NodeRoles, VertexId};
use crate::types::Strand;

/// Node weight: a copy of the location row plus dataset presence.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttrs {
    pub vertex_id: VertexId,
    pub chrom: String,
    pub coord: u32,
    pub strand: Strand,
    pub roles: NodeRoles,
    pub datasets: Vec<String>,
}

/// Edge weight: a copy of the edge row plus dataset presence.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeAttrs {
    pub edge_type: EdgeType,
    pub strand: Strand,
    pub datasets: Vec<String>,
}

/// Directed splice graph. `NodeIndex::new(v)` is vertex `v`.
pub type SpliceDiGraph = DiGraph<VertexAttrs, EdgeAttrs>;

/// Materialize the tables as a directed graph.
///
/// Nodes are added in vertex-id order, which requires dense ids. Edges come
/// from walking every transcript path; a pair shared by several transcripts
/// collapses into one edge.
pub fn assemble(
    locations: &LocationTable,
    edges: &EdgeTable,
    transcripts: &TranscriptTable,
    provenance: &Provenance,
) -> Result<SpliceDiGraph> {
    if !locations.is_dense() {
        return Err(GraphError::invalid_path(
            "<assemble>",
            "vertex ids are not dense; reorder before assembling",
        ));
    }

    let mut g = SpliceDiGraph::with_capacity(locations.len(), edges.len());
    for loc in locations.iter() {
        let idx = g.add_node(VertexAttrs {
            vertex_id: loc.vertex_id,
            chrom: loc.chrom.clone(),
            coord: loc.coord,
            strand: loc.strand,
            roles: loc.roles,
            datasets: provenance.datasets_with_vertex(loc.vertex_id),
        });
        debug_assert_eq!(idx.index(), loc.vertex_id);
    }

    for t in transcripts.iter() {
        for (v1, v2) in t.edge_ids() {
            let edge = edges.get(v1, v2).ok_or_else(|| {
                GraphError::invalid_path(&t.tid, format!("no edge ({v1}, {v2}) in edge table"))
            })?;
            let (a, b) = (NodeIndex::new(v1), NodeIndex::new(v2));
            if g.find_edge(a, b).is_none() {
                g.add_edge(
                    a,
                    b,
                    EdgeAttrs {
                        edge_type: edge.edge_type,
                        strand: edge.strand,
                        datasets: provenance.datasets_with_edge((v1, v2)),
                    },
                );
            }
        }
    }

    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::path::PathBuilder;
    use crate::model::transcript::TranscriptRecord;
    use petgraph::visit::EdgeRef;
    use std::collections::BTreeSet;

    fn tables() -> (LocationTable, EdgeTable, TranscriptTable, Provenance) {
        let mut locs = LocationTable::new();
        let mut edges = EdgeTable::new();
        let mut b = PathBuilder::new(&mut locs, &mut edges);
        let t1 = b
            .build(&TranscriptRecord::new("T1", "G1", "A", "chr1", Strand::Plus).with_exons(&[(1, 10), (20, 30)]))
            .unwrap();
        let t2 = b
            .build(&TranscriptRecord::new("T2", "G1", "A", "chr1", Strand::Plus).with_exons(&[(1, 10), (20, 40)]))
            .unwrap();
        let txs = TranscriptTable::from_rows(vec![t1, t2]);

        let mut prov = Provenance::new();
        prov.add_dataset("annotation").unwrap();
        for v in locs.ids() {
            prov.mark_vertex("annotation", v).unwrap();
        }
        (locs, edges, txs, prov)
    }

    #[test]
    fn nodes_and_edges_match_tables() {
        let (locs, edges, txs, prov) = tables();
        let g = assemble(&locs, &edges, &txs, &prov).unwrap();

        assert_eq!(g.node_count(), locs.len());
        assert_eq!(g.edge_count(), edges.len());

        let graph_edges: BTreeSet<(usize, usize)> = g
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();
        let table_edges: BTreeSet<(usize, usize)> = edges.iter().map(|e| e.id()).collect();
        assert_eq!(graph_edges, table_edges);

        assert_eq!(g[NodeIndex::new(0)].coord, 1);
        assert_eq!(g[NodeIndex::new(0)].datasets, vec!["annotation".to_string()]);
    }

    #[test]
    fn assembling_twice_is_identical() {
        let (locs, edges, txs, prov) = tables();
        let a = assemble(&locs, &edges, &txs, &prov).unwrap();
        let b = assemble(&locs, &edges, &txs, &prov).unwrap();
        assert_eq!(a.node_weights().collect::<Vec<_>>(), b.node_weights().collect::<Vec<_>>());
        assert_eq!(a.edge_weights().collect::<Vec<_>>(), b.edge_weights().collect::<Vec<_>>());
    }

    #[test]
    fn missing_edge_row_is_reported() {
        let (locs, _, txs, prov) = tables();
        let err = assemble(&locs, &EdgeTable::new(), &txs, &prov).unwrap_err();
        assert!(matches!(err, GraphError::InvalidPath { .. }));
    }
}
