//! Assigning the requested amount to ranked candidate paths.

use crate::config::TraversalConfig;
use crate::error::RouterResult;
use crate::limits::{hop_limits, path_limit, within_limits};
use crate::paths::{Path, PathWithAmount};
use primitive_types::U256;
use sor_domain::enums::SwapKind;
use tracing::{debug, trace};

/// A candidate with its hop limits and the most it can carry.
struct Feasible {
    path: Path,
    limits: Vec<U256>,
    capacity: U256,
}

impl Feasible {
    /// Prices `amount` along the path, rejecting quotes that break a hop
    /// limit.
    fn price(&self, kind: SwapKind, amount: U256) -> RouterResult<Option<PathWithAmount>> {
        let Some(quoted) = PathWithAmount::new(self.path.clone(), kind, amount)? else {
            return Ok(None);
        };
        if !within_limits(kind, &quoted.hop_amounts, &self.limits) {
            return Ok(None);
        }
        Ok(Some(quoted))
    }
}

/// Whether `a` beats `b` for the trader.
fn better(kind: SwapKind, a: &PathWithAmount, b: &PathWithAmount) -> bool {
    match kind {
        SwapKind::GivenIn => a.output_amount > b.output_amount,
        SwapKind::GivenOut => a.input_amount < b.input_amount,
    }
}

fn feasible_candidates(
    candidates: Vec<Path>,
    kind: SwapKind,
    amount: U256,
    config: &TraversalConfig,
) -> RouterResult<Vec<Feasible>> {
    let mut feasible = Vec::with_capacity(candidates.len());
    for path in candidates {
        let limits = hop_limits(&path, kind)?;
        let capacity = path_limit(&path, kind, &limits, amount, config.limit_refinement_steps)?;
        trace!(pools = ?path.pool_ids(), capacity = %capacity, "candidate evaluated");
        if capacity.is_zero() {
            continue;
        }
        feasible.push(Feasible {
            path,
            limits,
            capacity,
        });
    }
    Ok(feasible)
}

/// The best single path that carries the whole amount.
fn best_single(feasible: &[Feasible], kind: SwapKind, amount: U256) -> RouterResult<Option<PathWithAmount>> {
    let mut best: Option<PathWithAmount> = None;
    for candidate in feasible.iter().filter(|f| f.capacity >= amount) {
        let Some(quoted) = candidate.price(kind, amount)? else {
            continue;
        };
        if best.as_ref().is_none_or(|b| better(kind, &quoted, b)) {
            best = Some(quoted);
        }
    }
    Ok(best)
}

/// Fills pool-disjoint paths in ranking order up to their capacity.
fn saturate(
    feasible: &[Feasible],
    kind: SwapKind,
    amount: U256,
    max_paths: usize,
) -> RouterResult<Option<Vec<PathWithAmount>>> {
    let mut chosen: Vec<PathWithAmount> = Vec::new();
    let mut remaining = amount;
    for candidate in feasible {
        if remaining.is_zero() || chosen.len() == max_paths {
            break;
        }
        if chosen.iter().any(|c| c.path.shares_pool_with(&candidate.path)) {
            continue;
        }
        let share = candidate.capacity.min(remaining);
        let Some(quoted) = candidate.price(kind, share)? else {
            continue;
        };
        remaining -= share;
        chosen.push(quoted);
    }
    if !remaining.is_zero() {
        debug!(unassigned = %remaining, paths = chosen.len(), "amount exceeds routable liquidity");
        return Ok(None);
    }
    Ok(Some(chosen))
}

/// Assigns `amount` across ranked candidates.
///
/// The best single path able to carry everything wins outright; otherwise
/// pool-disjoint candidates are saturated in ranking order, at most
/// `max_paths` of them. The given amounts of the result always add up to
/// `amount`; `None` when they cannot.
pub fn split_amount(
    candidates: Vec<Path>,
    kind: SwapKind,
    amount: U256,
    config: &TraversalConfig,
) -> RouterResult<Option<Vec<PathWithAmount>>> {
    let feasible = feasible_candidates(candidates, kind, amount, config)?;
    if feasible.is_empty() {
        debug!("no feasible candidate path");
        return Ok(None);
    }
    if let Some(single) = best_single(&feasible, kind, amount)? {
        debug!(pools = ?single.path.pool_ids(), "single path carries the full amount");
        return Ok(Some(vec![single]));
    }
    let split = saturate(&feasible, kind, amount, config.max_paths)?;
    if let Some(paths) = &split {
        debug!(paths = paths.len(), "amount split across paths");
    }
    Ok(split)
}
