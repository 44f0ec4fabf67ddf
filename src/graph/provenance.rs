use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::path::TranscriptPath;
use crate::graph::remap::IdMap;
use crate::model::types::{EdgeId, VertexId, RESERVED_COLUMNS};

/// Which dataset contributed which vertices, edges and transcript rows.
///
/// A row is absent from a dataset exactly when its key is not in that
/// dataset's set, so "not present" is always a definite `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    datasets: Vec<String>,
    vertices: BTreeMap<String, BTreeSet<VertexId>>,
    edges: BTreeMap<String, BTreeSet<EdgeId>>,
    transcripts: BTreeMap<String, BTreeSet<TranscriptPath>>,
}

impl Provenance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Datasets in the order they were added.
    pub fn datasets(&self) -> &[String] {
        &self.datasets
    }

    pub fn contains(&self, dataset: &str) -> bool {
        self.datasets.iter().any(|d| d == dataset)
    }

    /// Fail unless `name` may be added as a new dataset.
    pub fn check_new_name(&self, name: &str) -> Result<()> {
        if RESERVED_COLUMNS.contains(&name) {
            return Err(GraphError::ReservedName(name.to_string()));
        }
        if name.trim().is_empty() {
            return Err(GraphError::Configuration("dataset name is empty".into()));
        }
        if self.contains(name) {
            return Err(GraphError::DuplicateDataset(name.to_string()));
        }
        Ok(())
    }

    /// Register a dataset with an empty contribution.
    pub fn add_dataset(&mut self, name: &str) -> Result<()> {
        self.check_new_name(name)?;
        self.datasets.push(name.to_string());
        self.vertices.insert(name.to_string(), BTreeSet::new());
        self.edges.insert(name.to_string(), BTreeSet::new());
        self.transcripts.insert(name.to_string(), BTreeSet::new());
        Ok(())
    }

    pub fn check(&self, dataset: &str) -> Result<()> {
        if self.contains(dataset) {
            Ok(())
        } else {
            Err(GraphError::DatasetNotFound(dataset.to_string()))
        }
    }

    pub fn mark_vertex(&mut self, dataset: &str, v: VertexId) -> Result<()> {
        self.check(dataset)?;
        self.vertices.entry(dataset.to_string()).or_default().insert(v);
        Ok(())
    }

    pub fn mark_edge(&mut self, dataset: &str, e: EdgeId) -> Result<()> {
        self.check(dataset)?;
        self.edges.entry(dataset.to_string()).or_default().insert(e);
        Ok(())
    }

    pub fn mark_transcript(&mut self, dataset: &str, row: &TranscriptPath) -> Result<()> {
        self.check(dataset)?;
        self.transcripts
            .entry(dataset.to_string())
            .or_default()
            .insert(row.clone());
        Ok(())
    }

    pub fn has_vertex(&self, dataset: &str, v: VertexId) -> bool {
        self.vertices.get(dataset).is_some_and(|s| s.contains(&v))
    }

    pub fn has_edge(&self, dataset: &str, e: EdgeId) -> bool {
        self.edges.get(dataset).is_some_and(|s| s.contains(&e))
    }

    /// True if `dataset` holds this exact row.
    pub fn has_transcript(&self, dataset: &str, row: &TranscriptPath) -> bool {
        self.transcripts.get(dataset).is_some_and(|s| s.contains(row))
    }

    /// True if `dataset` holds any row under `tid`.
    pub fn has_tid(&self, dataset: &str, tid: &str) -> bool {
        self.transcripts
            .get(dataset)
            .is_some_and(|s| s.iter().any(|t| t.tid == tid))
    }

    pub fn vertices_of(&self, dataset: &str) -> Option<&BTreeSet<VertexId>> {
        self.vertices.get(dataset)
    }

    pub fn edges_of(&self, dataset: &str) -> Option<&BTreeSet<EdgeId>> {
        self.edges.get(dataset)
    }

    pub fn transcripts_of(&self, dataset: &str) -> Option<&BTreeSet<TranscriptPath>> {
        self.transcripts.get(dataset)
    }

    /// Datasets containing vertex `v`, in dataset order.
    pub fn datasets_with_vertex(&self, v: VertexId) -> Vec<String> {
        self.datasets
            .iter()
            .filter(|d| self.has_vertex(d, v))
            .cloned()
            .collect()
    }

    pub fn datasets_with_edge(&self, e: EdgeId) -> Vec<String> {
        self.datasets
            .iter()
            .filter(|d| self.has_edge(d, e))
            .cloned()
            .collect()
    }

    /// Take over every dataset of `other`. Names must not collide.
    pub fn absorb(&mut self, other: Provenance) -> Result<()> {
        for name in &other.datasets {
            self.check_new_name(name)?;
        }
        let Provenance {
            datasets,
            mut vertices,
            mut edges,
            mut transcripts,
        } = other;
        for name in datasets {
            self.vertices
                .insert(name.clone(), vertices.remove(&name).unwrap_or_default());
            self.edges
                .insert(name.clone(), edges.remove(&name).unwrap_or_default());
            self.transcripts
                .insert(name.clone(), transcripts.remove(&name).unwrap_or_default());
            self.datasets.push(name);
        }
        Ok(())
    }

    /// Rewrite stored vertex ids (edge keys and transcript paths too) through `map`.
    pub fn remap(self, map: &IdMap) -> Result<Self> {
        let vertices = self
            .vertices
            .into_iter()
            .map(|(name, set)| {
                let set = set
                    .into_iter()
                    .map(|v| map.apply(v, &name))
                    .collect::<Result<BTreeSet<_>>>()?;
                Ok((name, set))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        let edges = self
            .edges
            .into_iter()
            .map(|(name, set)| {
                let set = set
                    .into_iter()
                    .map(|(v1, v2)| Ok((map.apply(v1, &name)?, map.apply(v2, &name)?)))
                    .collect::<Result<BTreeSet<_>>>()?;
                Ok((name, set))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        let transcripts = self
            .transcripts
            .into_iter()
            .map(|(name, set)| {
                let set = set
                    .into_iter()
                    .map(|t| t.remap(map))
                    .collect::<Result<BTreeSet<_>>>()?;
                Ok((name, set))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self {
            datasets: self.datasets,
            vertices,
            edges,
            transcripts,
        })
    }

    /// Drop every key not accepted by the filters (ids unchanged).
    pub fn restrict(
        &mut self,
        keep_vertex: impl Fn(VertexId) -> bool,
        keep_edge: impl Fn(&EdgeId) -> bool,
        keep_row: impl Fn(&TranscriptPath) -> bool,
    ) {
        for set in self.vertices.values_mut() {
            set.retain(|&v| keep_vertex(v));
        }
        for set in self.edges.values_mut() {
            set.retain(|e| keep_edge(e));
        }
        for set in self.transcripts.values_mut() {
            set.retain(|t| keep_row(t));
        }
    }
}
