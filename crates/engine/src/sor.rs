//! The smart order router facade.

use crate::config::SorConfig;
use crate::error::SorResult;
use crate::factory::{build_buffers, build_pool};
use crate::request::SwapRequest;
use crate::result::SwapResult;
use sor_domain::entities::PoolSnapshot;
use sor_domain::enums::PoolType;
use sor_protocols::base_pool::BasePool;
use sor_router::Router;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// A pool record that could not be turned into a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPool {
    pub id: String,
    pub reason: String,
}

/// Pool models built from one snapshot.
#[derive(Debug, Clone, Default)]
pub struct BuiltPools {
    pub pools: Vec<Arc<dyn BasePool>>,
    pub skipped: Vec<SkippedPool>,
}

/// Routes swaps against pool snapshots.
#[derive(Debug, Clone, Default)]
pub struct Sor {
    config: SorConfig,
    router: Router,
}

impl Sor {
    pub fn new(config: SorConfig) -> Self {
        Self {
            config,
            router: Router::new(),
        }
    }

    pub fn config(&self) -> &SorConfig {
        &self.config
    }

    /// Builds every pool model of `snapshot` as of `timestamp`, plus one
    /// buffer per ERC4626 token when buffers are enabled. Records that fail
    /// are logged and reported in [`BuiltPools::skipped`].
    pub fn build_pools_report(&self, snapshot: &PoolSnapshot, timestamp: u64) -> BuiltPools {
        let mut built = BuiltPools::default();
        let mut buffers: BTreeMap<String, Arc<dyn BasePool>> = BTreeMap::new();
        for record in &snapshot.pools {
            match build_pool(record, timestamp) {
                Ok(pool) => built.pools.push(pool),
                Err(e) => {
                    warn!(pool = %record.id, pool_type = %record.pool_type, error = %e, "Skipping pool");
                    built.skipped.push(SkippedPool {
                        id: record.id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            }
            if !self.config.enable_buffers {
                continue;
            }
            match build_buffers(record) {
                Ok(found) => {
                    for (wrapped, pool) in found {
                        buffers.entry(wrapped).or_insert(pool);
                    }
                }
                Err(e) => warn!(pool = %record.id, error = %e, "Skipping buffers"),
            }
        }
        // a snapshot may also list a buffer explicitly
        built
            .pools
            .retain(|p| !(p.pool_type() == PoolType::Buffer && buffers.contains_key(p.id())));
        built.pools.extend(buffers.into_values());
        built
    }

    /// The pool models of `snapshot` at `timestamp`, skipping failures.
    pub fn build_pools(&self, snapshot: &PoolSnapshot, timestamp: u64) -> Vec<Arc<dyn BasePool>> {
        self.build_pools_report(snapshot, timestamp).pools
    }

    /// Routes `request` through the pools of `snapshot`.
    ///
    /// Returns `Ok(None)` when no route carries the full amount.
    ///
    /// # Errors
    /// Invalid requests, and pool failures other than lack of capacity.
    pub fn get_swap_paths(&self, request: &SwapRequest, snapshot: &PoolSnapshot) -> SorResult<Option<SwapResult>> {
        request.validate()?;
        let traversal = request.overrides.apply(self.config.traversal);
        let pools = self.build_pools(snapshot, request.timestamp);
        let paths = self.router.get_paths(
            &request.token_in,
            &request.token_out,
            request.kind,
            request.amount.amount,
            &pools,
            &traversal,
        )?;
        let Some(paths) = paths else {
            info!(
                token_in = %request.token_in,
                token_out = %request.token_out,
                kind = %request.kind,
                amount = %request.amount.amount,
                pools = pools.len(),
                "No route found"
            );
            return Ok(None);
        };
        let result = SwapResult::new(request.kind, request.token_in.clone(), request.token_out.clone(), paths);
        info!(
            token_in = %request.token_in,
            token_out = %request.token_out,
            kind = %request.kind,
            paths = result.paths.len(),
            input = %result.input_amount.amount,
            output = %result.output_amount.amount,
            "Swap routed"
        );
        Ok(Some(result))
    }
}
