//! Error types for graph construction.

use thiserror::Error;

/// Errors that abort a graph build as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The reference graph is not acyclic. Carries a bounded, non-exhaustive
    /// sample of cycles, each as an ordered list of full addresses.
    #[error("Circular dependency detected: {}", format_cycles(.cycles))]
    CircularDependency { cycles: Vec<Vec<String>> },

    #[error("Invalid cell address {address:?} on sheet {sheet:?}")]
    InvalidAddress { sheet: String, address: String },

    /// Internal: an acyclic graph produced no complete topological order.
    #[error("Level assignment failed: {unresolved} cells never became ready")]
    LevelingInvariantViolation { unresolved: usize },
}

impl GraphError {
    /// The sampled cycles, if this is a circular dependency.
    pub fn cycles(&self) -> &[Vec<String>] {
        match self {
            GraphError::CircularDependency { cycles } => cycles,
            _ => &[],
        }
    }
}

fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| cycle.join(" -> "))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_message_lists_cycles() {
        let err = GraphError::CircularDependency {
            cycles: vec![vec!["S!A1".to_string(), "S!B1".to_string()]],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: S!A1 -> S!B1");
        assert_eq!(err.cycles().len(), 1);
    }
}
