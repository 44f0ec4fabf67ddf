use std::fmt;

use serde::{Deserialize, Serialize};

/// Genomic strand/orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    /// Parse the GTF strand column. Returns `None` for anything but `+ - . ?`.
    pub fn from_gtf(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            "." | "?" => Some(Strand::Unknown),
            _ => None,
        }
    }

    /// True if transcription runs from high to low genomic coordinates.
    #[inline]
    pub fn is_reverse(self) -> bool {
        self == Strand::Minus
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strand::Plus => "+",
            Strand::Minus => "-",
            Strand::Unknown => ".",
        };
        write!(f, "{s}")
    }
}

/// One exon block in GTF coordinates: 1-based, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exon {
    pub start: u32,
    pub end: u32,
}

impl Exon {
    /// Create a new exon.
    ///
    /// # Panics
    ///
    /// If `start > end`. Parsed GTF lines are checked before reaching here.
    pub fn new(start: u32, end: u32) -> Self {
        assert!(start <= end, "Exon requires start <= end");
        Self { start, end }
    }

    #[inline]
    pub fn len(self) -> u32 {
        self.end - self.start + 1
    }

    /// Exon boundaries in transcription order.
    ///
    /// `+` (and unknown) strand: (start, end). `-` strand: (end, start).
    #[inline]
    pub fn boundaries(self, strand: Strand) -> (u32, u32) {
        if strand.is_reverse() {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        }
    }

    /// Sort exons by start and merge overlapping or touching blocks.
    ///
    /// Touching blocks would share a boundary coordinate and produce an
    /// intron that starts and ends on the same vertex.
    pub fn merge_sorted(mut exons: Vec<Exon>) -> Vec<Exon> {
        if exons.is_empty() {
            return exons;
        }

        exons.sort_by_key(|e| (e.start, e.end));

        let mut merged: Vec<Exon> = Vec::with_capacity(exons.len());
        let mut cur = exons[0];

        for &e in &exons[1..] {
            if e.start <= cur.end {
                cur.end = cur.end.max(e.end);
            } else {
                merged.push(cur);
                cur = e;
            }
        }
        merged.push(cur);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_follow_transcription_direction() {
        let e = Exon::new(100, 200);
        assert_eq!(e.boundaries(Strand::Plus), (100, 200));
        assert_eq!(e.boundaries(Strand::Minus), (200, 100));
        assert_eq!(e.boundaries(Strand::Unknown), (100, 200));
        assert_eq!(e.len(), 101);
    }

    #[test]
    fn merge_sorted_sorts_and_merges() {
        let merged = Exon::merge_sorted(vec![
            Exon::new(300, 400),
            Exon::new(100, 120),
            Exon::new(110, 130), // overlap with previous
            Exon::new(130, 150), // shares a boundary
        ]);
        assert_eq!(merged, vec![Exon::new(100, 150), Exon::new(300, 400)]);
    }

    #[test]
    fn strand_parse_and_display() {
        assert_eq!(Strand::from_gtf("-"), Some(Strand::Minus));
        assert_eq!(Strand::from_gtf("?"), Some(Strand::Unknown));
        assert_eq!(Strand::from_gtf("x"), None);
        assert_eq!(Strand::Plus.to_string(), "+");
    }
}
