use std::collections::HashMap;
use std::io::BufRead;

use thiserror::Error;

use crate::types::Strand;

/// Attribute syntax of the ninth column.
///
/// - GFF3: key=value;key2=value2
/// - GTF:  key "value"; key2 "value2";
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Gff3,
    Gtf,
    Unknown,
}

/// A single feature line of a GTF/GFF3 file.
///
/// `start`/`end` are kept exactly as written: 1-based and inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub line_no: usize,
    pub seqname: String,
    pub feature_type: String,
    pub start: u32,
    pub end: u32,
    pub strand: Strand,
    pub attrs: HashMap<String, String>,
    pub dialect: Dialect,
}

impl AnnotationRecord {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|s| s.as_str())
    }

    pub fn is_feature(&self, types: &[String]) -> bool {
        types.iter().any(|t| t == &self.feature_type)
    }

    /// First non-empty value among `keys`.
    pub fn pick_first_attr(&self, keys: &[String]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.attr(k))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error while reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line_no}: malformed GTF/GFF line ({problem}): {line}")]
    MalformedLine {
        line_no: usize,
        problem: &'static str,
        line: String,
    },

    #[error("line {line_no}: bad coordinates: {line}")]
    BadCoordinates { line_no: usize, line: String },

    #[error("line {line_no}: missing attribute, tried keys {tried:?}")]
    MissingAttribute { line_no: usize, tried: Vec<String> },
}

/// Streaming reader over the feature lines of a GTF/GFF3 file.
///
/// Most callers want [`crate::annotation::AnnotationBuilder`], which groups
/// exon lines into transcripts.
///
/// ```no_run
/// use std::fs::File;
/// use std::io::BufReader;
/// use gtf_splice_graph::annotation::io::AnnotationReader;
///
/// let reader = BufReader::new(File::open("genes.gtf").unwrap());
/// for rec in AnnotationReader::new(reader).records() {
///     let rec = rec.unwrap();
///     println!("{} {}-{}", rec.seqname, rec.start, rec.end);
/// }
/// ```
pub struct AnnotationReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> AnnotationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Iterator over parsed records. Blank lines and `#` comments are skipped.
    pub fn records(mut self) -> impl Iterator<Item = Result<AnnotationRecord, ParseError>> {
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => {
                    return Some(Err(ParseError::Io {
                        path: "<reader>".to_string(),
                        source: e,
                    }))
                }
            }

            let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            return Some(parse_record_line(line, self.line_no));
        })
    }
}

/// Parse one non-comment line.
pub fn parse_record_line(line: &str, line_no: usize) -> Result<AnnotationRecord, ParseError> {
    let malformed = |problem: &'static str| ParseError::MalformedLine {
        line_no,
        problem,
        line: line.to_string(),
    };

    // seqname source feature start end score strand phase attributes
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() != 9 {
        return Err(malformed("expected 9 tab-separated columns"));
    }

    let bad_coords = || ParseError::BadCoordinates {
        line_no,
        line: line.to_string(),
    };
    let start: u32 = cols[3].parse().map_err(|_| bad_coords())?;
    let end: u32 = cols[4].parse().map_err(|_| bad_coords())?;
    if start == 0 || end < start {
        return Err(bad_coords());
    }

    let strand = Strand::from_gtf(cols[6]).ok_or_else(|| malformed("unknown strand"))?;
    let (dialect, attrs) = parse_attributes(cols[8]);

    Ok(AnnotationRecord {
        line_no,
        seqname: cols[0].to_string(),
        feature_type: cols[2].to_string(),
        start,
        end,
        strand,
        attrs,
        dialect,
    })
}

/// Parse the attribute column, guessing the dialect.
///
/// '=' anywhere means GFF3, quotes mean GTF; otherwise each part is parsed
/// best-effort with whichever separator it contains.
pub fn parse_attributes(s: &str) -> (Dialect, HashMap<String, String>) {
    let s = s.trim();

    let dialect = if s.contains('=') {
        Dialect::Gff3
    } else if s.contains('"') {
        Dialect::Gtf
    } else {
        Dialect::Unknown
    };

    let mut map = HashMap::new();
    for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let kv = match dialect {
            Dialect::Gff3 => part.split_once('='),
            Dialect::Gtf => part.split_once(char::is_whitespace),
            Dialect::Unknown => part
                .split_once('=')
                .or_else(|| part.split_once(char::is_whitespace)),
        };
        let Some((k, v)) = kv else { continue };
        let (k, v) = (k.trim(), unquote(v));
        if !k.is_empty() && !v.is_empty() {
            map.insert(k.to_string(), v);
        }
    }

    (dialect, map)
}

fn unquote(v: &str) -> String {
    let v = v.trim();
    let v = v.strip_prefix('"').unwrap_or(v);
    let v = v.strip_suffix('"').unwrap_or(v);
    v.to_string()
}
