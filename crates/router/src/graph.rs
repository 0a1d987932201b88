//! Token graph: tokens are nodes, each pool contributes one directed edge
//! per ordered pair of its tokens.

use sor_domain::enums::PoolType;
use sor_domain::token::Token;
use sor_protocols::base_pool::BasePool;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// A directed hop through one pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Position of the pool in the slice the graph was built from.
    pub pool: usize,
    pub token_out: Token,
}

/// Adjacency lists keyed by lowercase token address. Ordered maps keep
/// traversal deterministic.
#[derive(Debug, Clone, Default)]
pub struct TokenGraph {
    tokens: BTreeMap<String, Token>,
    edges: BTreeMap<String, Vec<Edge>>,
}

/// Every tradable token of a pool, its share token included.
fn pool_tokens(pool: &dyn BasePool) -> Vec<Token> {
    let mut tokens: Vec<Token> = pool.tokens().iter().map(|t| t.token.clone()).collect();
    if let Some(bpt) = pool.bpt_token()
        && !tokens.contains(&bpt)
    {
        tokens.push(bpt);
    }
    tokens
}

impl TokenGraph {
    /// Builds the graph for one request.
    ///
    /// A pool's share token becomes a node only when another pool holds it
    /// or the request trades it; otherwise every pool would grow a dead-end
    /// join/exit edge.
    pub fn build(pools: &[Arc<dyn BasePool>], token_in: &Token, token_out: &Token) -> Self {
        let share_tokens: BTreeSet<&str> = pools
            .iter()
            .filter(|p| p.pool_type() != PoolType::Buffer)
            .map(|p| p.address())
            .collect();

        // share tokens held by a pool other than their own
        let mut nested: BTreeSet<String> = BTreeSet::new();
        for pool in pools {
            for token in pool.tokens() {
                let address = token.token.address.as_str();
                if share_tokens.contains(address) && !pool.address().eq_ignore_ascii_case(address) {
                    nested.insert(address.to_string());
                }
            }
        }

        let include = |token: &Token| {
            !share_tokens.contains(token.address.as_str())
                || nested.contains(&token.address)
                || token == token_in
                || token == token_out
        };

        let mut graph = TokenGraph::default();
        for (index, pool) in pools.iter().enumerate() {
            let tokens: Vec<Token> = pool_tokens(pool.as_ref()).into_iter().filter(|t| include(t)).collect();
            for a in &tokens {
                graph.tokens.entry(a.address.clone()).or_insert_with(|| a.clone());
                for b in &tokens {
                    if a == b {
                        continue;
                    }
                    graph.edges.entry(a.address.clone()).or_default().push(Edge {
                        pool: index,
                        token_out: b.clone(),
                    });
                }
            }
        }
        debug!(
            pools = pools.len(),
            tokens = graph.token_count(),
            edges = graph.edge_count(),
            "token graph built"
        );
        graph
    }

    /// Outgoing hops from `token`, in pool order.
    pub fn neighbours(&self, token: &Token) -> &[Edge] {
        self.edges
            .get(&token.address)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, token: &Token) -> bool {
        self.tokens.contains_key(&token.address)
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pools::{token, weighted};

    #[test]
    fn test_edges_per_ordered_pair() {
        let pools = vec![weighted("p1", "0xp1", &[("0xa", 100), ("0xb", 100), ("0xc", 100)])];
        let graph = TokenGraph::build(&pools, &token("0xa"), &token("0xb"));
        assert_eq!(graph.token_count(), 3);
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.neighbours(&token("0xa")).len(), 2);
        assert!(graph.neighbours(&token("0xz")).is_empty());
    }

    #[test]
    fn test_share_token_only_when_used() {
        let inner = weighted("inner", "0xinner", &[("0xa", 100), ("0xb", 100)]);
        let lonely = weighted("lonely", "0xlonely", &[("0xc", 100), ("0xd", 100)]);
        let pools = vec![inner, lonely];

        let graph = TokenGraph::build(&pools, &token("0xa"), &token("0xc"));
        assert!(!graph.contains(&token("0xinner")));
        assert!(!graph.contains(&token("0xlonely")));

        // requested directly
        let graph = TokenGraph::build(&pools, &token("0xa"), &token("0xinner"));
        assert!(graph.contains(&token("0xinner")));

        // held by another pool
        let outer = weighted("outer", "0xouter", &[("0xinner", 100), ("0xe", 100)]);
        let pools = vec![pools[0].clone(), outer];
        let graph = TokenGraph::build(&pools, &token("0xa"), &token("0xe"));
        assert!(graph.contains(&token("0xinner")));
        assert!(!graph.contains(&token("0xouter")));
    }
}
