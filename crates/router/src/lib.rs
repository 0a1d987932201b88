//! Path finding for the smart order router.
//!
//! [`Router::get_paths`] builds a token graph from the pool models of one
//! snapshot, enumerates and ranks candidate paths, bounds each path by the
//! limits of its hops and assigns the requested amount to one path or a
//! pool-disjoint split of several.

/// Prelude module for convenient imports.
pub mod prelude;

/// Traversal configuration.
pub mod config;
/// Error types.
pub mod error;
/// Token graph.
pub mod graph;
/// Hop and path limits.
pub mod limits;
/// Path types.
pub mod paths;
/// Router entry point.
pub mod router;
/// Candidate enumeration and ranking.
pub mod search;
/// Amount splitting.
pub mod split;

#[cfg(test)]
mod test_pools;

pub use router::Router;
