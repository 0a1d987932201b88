//! Facade configuration.

use serde::{Deserialize, Serialize};
use sor_router::config::TraversalConfig;

/// Configuration of a [`Sor`](crate::Sor) instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SorConfig {
    /// Default traversal bounds; requests may override them.
    pub traversal: TraversalConfig,
    /// Synthesize a wrap/unwrap buffer for every ERC4626 token of a vault
    /// pool.
    pub enable_buffers: bool,
}

impl Default for SorConfig {
    fn default() -> Self {
        Self {
            traversal: TraversalConfig::default(),
            enable_buffers: true,
        }
    }
}

impl SorConfig {
    #[must_use]
    pub fn with_traversal(mut self, traversal: TraversalConfig) -> Self {
        self.traversal = traversal;
        self
    }

    #[must_use]
    pub fn with_buffers(mut self, enabled: bool) -> Self {
        self.enable_buffers = enabled;
        self
    }
}
