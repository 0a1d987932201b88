//! Candidate enumeration and ranking.

use crate::config::TraversalConfig;
use crate::graph::TokenGraph;
use crate::paths::Path;
use primitive_types::U256;
use sor_domain::token::Token;
use sor_protocols::base_pool::BasePool;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Partial path during the depth-first walk.
struct Walk<'a> {
    graph: &'a TokenGraph,
    pools: &'a [Arc<dyn BasePool>],
    token_out: &'a Token,
    max_hops: usize,
    tokens: Vec<Token>,
    pool_indices: Vec<usize>,
    found: Vec<Path>,
}

impl Walk<'_> {
    fn visit(&mut self, current: &Token) {
        if self.pool_indices.len() == self.max_hops {
            return;
        }
        for edge in self.graph.neighbours(current) {
            if self.pool_indices.contains(&edge.pool) || self.tokens.contains(&edge.token_out) {
                continue;
            }
            self.tokens.push(edge.token_out.clone());
            self.pool_indices.push(edge.pool);
            if &edge.token_out == self.token_out {
                let pools = self.pool_indices.iter().map(|&i| Arc::clone(&self.pools[i])).collect();
                self.found.push(Path::new(self.tokens.clone(), pools));
            } else {
                self.visit(&edge.token_out);
            }
            self.tokens.pop();
            self.pool_indices.pop();
        }
    }
}

/// Every simple path (no pool or token twice) from `token_in` to
/// `token_out` with at most `max_hops` hops, in discovery order.
pub fn enumerate_paths(
    graph: &TokenGraph,
    pools: &[Arc<dyn BasePool>],
    token_in: &Token,
    token_out: &Token,
    max_hops: usize,
) -> Vec<Path> {
    let mut walk = Walk {
        graph,
        pools,
        token_out,
        max_hops,
        tokens: vec![token_in.clone()],
        pool_indices: Vec::new(),
        found: Vec::new(),
    };
    walk.visit(token_in);
    walk.found
}

/// Orders by weakest-hop liquidity (descending), then fewer hops, then the
/// pool id sequence so equal scores still sort the same way every time.
fn rank(a: &(U256, Path), b: &(U256, Path)) -> Ordering {
    b.0.cmp(&a.0)
        .then_with(|| a.1.hop_count().cmp(&b.1.hop_count()))
        .then_with(|| a.1.pool_ids().cmp(&b.1.pool_ids()))
}

/// Enumerates, ranks and truncates the candidate paths for a request.
pub fn candidate_paths(
    graph: &TokenGraph,
    pools: &[Arc<dyn BasePool>],
    token_in: &Token,
    token_out: &Token,
    config: &TraversalConfig,
) -> Vec<Path> {
    let mut scored: Vec<(U256, Path)> = enumerate_paths(graph, pools, token_in, token_out, config.max_hops)
        .into_iter()
        .map(|path| (path.min_normalized_liquidity(), path))
        .collect();
    let total = scored.len();
    scored.sort_by(rank);
    scored.truncate(config.max_candidates);
    debug!(found = total, kept = scored.len(), "candidate paths ranked");
    scored.into_iter().map(|(_, path)| path).collect()
}
