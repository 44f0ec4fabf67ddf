pub mod types;
pub mod transcript;
pub mod gene;

pub use types::{EdgeId, EdgeType, NodeRoles, VertexId, RESERVED_COLUMNS};
