//! cellgraph_engine - Formula parsing, reference extraction and classification.

pub(crate) mod functions;
pub mod engine;

pub use functions::{COMPLEX_FUNCTIONS, KNOWN_FUNCTIONS, KnownFunction, VECTORIZABLE_FUNCTIONS};
