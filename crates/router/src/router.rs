//! Entry point tying graph, search and splitting together.

use crate::config::TraversalConfig;
use crate::error::{RouterError, RouterResult};
use crate::graph::TokenGraph;
use crate::paths::PathWithAmount;
use crate::search::candidate_paths;
use crate::split::split_amount;
use primitive_types::U256;
use sor_domain::enums::SwapKind;
use sor_domain::token::Token;
use sor_protocols::base_pool::BasePool;
use std::sync::Arc;
use tracing::debug;

/// Stateless path finder over a set of pool models.
#[derive(Debug, Clone, Copy, Default)]
pub struct Router;

impl Router {
    pub fn new() -> Self {
        Self
    }

    /// Finds the paths and per-path amounts for a swap.
    ///
    /// `amount` is the input for `GivenIn` and the output for `GivenOut`,
    /// raw in its token's decimals. Returns `None` when no combination of
    /// candidate paths can carry the full amount.
    pub fn get_paths(
        &self,
        token_in: &Token,
        token_out: &Token,
        kind: SwapKind,
        amount: U256,
        pools: &[Arc<dyn BasePool>],
        config: &TraversalConfig,
    ) -> RouterResult<Option<Vec<PathWithAmount>>> {
        if token_in == token_out {
            return Err(RouterError::SameToken);
        }
        if amount.is_zero() {
            return Err(RouterError::ZeroAmount);
        }
        let graph = TokenGraph::build(pools, token_in, token_out);
        if !graph.contains(token_in) || !graph.contains(token_out) {
            debug!(token_in = %token_in.address, token_out = %token_out.address, "token not in any pool");
            return Ok(None);
        }
        let candidates = candidate_paths(&graph, pools, token_in, token_out, config);
        if candidates.is_empty() {
            return Ok(None);
        }
        split_amount(candidates, kind, amount, config)
    }
}
