//! Build configuration.
//!
//! Loading is left to the caller; `GraphConfig` deserializes from any serde
//! format so it can sit inside a larger config file.

use serde::{Deserialize, Serialize};

/// Most cycles a [`GraphError::CircularDependency`](crate::GraphError) ever carries.
pub const MAX_CYCLE_SAMPLES: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// How many cycles to sample when the build fails (clamped to `1..=5`).
    pub max_cycle_samples: usize,
    /// Analyze formulas on the rayon pool. Ignored without the `parallel` feature.
    pub parallel: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            max_cycle_samples: MAX_CYCLE_SAMPLES,
            parallel: true,
        }
    }
}

impl GraphConfig {
    pub(crate) fn cycle_sample_limit(&self) -> usize {
        self.max_cycle_samples.clamp(1, MAX_CYCLE_SAMPLES)
    }
}
