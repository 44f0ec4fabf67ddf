use serde::{Deserialize, Serialize};

/// A gene and the rows of the transcript table that belong to it.
///
/// Notes:
/// - `names[0]` is the primary display name (if present).
/// - `transcripts` holds indices into the graph's transcript table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub id: String,
    pub names: Vec<String>,
    transcripts: Vec<usize>,
}

impl Gene {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            names: Vec::new(),
            transcripts: Vec::new(),
        }
    }

    /// Add a display name (deduped, empty names ignored).
    pub fn add_name(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }

    pub fn primary_name(&self) -> Option<&str> {
        self.names.first().map(|s| s.as_str())
    }

    pub fn add_transcript(&mut self, row: usize) {
        self.transcripts.push(row);
    }

    pub fn transcripts(&self) -> &[usize] {
        &self.transcripts
    }

    /// Sort transcript rows and remove duplicates.
    pub fn finalize(&mut self) {
        self.transcripts.sort_unstable();
        self.transcripts.dedup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_deduped_and_primary_kept() {
        let mut g = Gene::new("ENSG01");
        g.add_name("Alpha");
        g.add_name("Alpha");
        g.add_name(" ");
        g.add_name("ALPHA1");
        assert_eq!(g.names, vec!["Alpha".to_string(), "ALPHA1".to_string()]);
        assert_eq!(g.primary_name(), Some("Alpha"));
    }

    #[test]
    fn finalize_sorts_and_dedups_rows() {
        let mut g = Gene::new("G1");
        g.add_transcript(10);
        g.add_transcript(3);
        g.add_transcript(10);
        g.finalize();
        assert_eq!(g.transcripts(), &[3, 10]);
    }
}
