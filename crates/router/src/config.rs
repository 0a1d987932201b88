//! Traversal limits of the router.

use serde::{Deserialize, Serialize};

/// Bounds on path search and splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Maximum pools on a path.
    pub max_hops: usize,
    /// Candidate paths kept after ranking.
    pub max_candidates: usize,
    /// Maximum paths in a split.
    pub max_paths: usize,
    /// Shrink attempts when fitting a path's amount under every hop limit.
    pub limit_refinement_steps: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_hops: 3,                // A -> X -> Y -> B
            max_candidates: 20,         // after ranking
            max_paths: 4,               // per split
            limit_refinement_steps: 32, // doubling steps from 0.01% of the first guess
        }
    }
}

impl TraversalConfig {
    #[must_use]
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    #[must_use]
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    #[must_use]
    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths;
        self
    }

    #[must_use]
    pub fn with_limit_refinement_steps(mut self, steps: usize) -> Self {
        self.limit_refinement_steps = steps;
        self
    }
}
