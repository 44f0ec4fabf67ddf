pub mod abundance;
pub mod builder;
pub mod io;
pub mod source;

pub use abundance::{read_abundance, Abundance, AbundanceOptions, AbundanceTable};
pub use builder::{AnnotationBuilder, IdNameKeys};
pub use io::{AnnotationReader, AnnotationRecord, Dialect, ParseError};
pub use source::{AnnotationSource, GtfSource};
