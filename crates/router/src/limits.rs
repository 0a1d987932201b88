//! Per-hop and per-path swap limits.
//!
//! A hop limit is what the pool reports for its leg: a maximum input for
//! `GivenIn`, a maximum output for `GivenOut`. A path limit is the largest
//! given amount for which every hop stays within its own limit.

use crate::error::RouterResult;
use crate::paths::Path;
use primitive_types::U256;
use sor_domain::enums::SwapKind;
use tracing::trace;

/// Limit of every hop in `kind` direction. Hops whose limit query is
/// infeasible count as zero.
pub fn hop_limits(path: &Path, kind: SwapKind) -> RouterResult<Vec<U256>> {
    path.hops()
        .map(|(pool, tin, tout)| match pool.get_limit_amount_swap(tin, tout, kind) {
            Ok(limit) => Ok(limit),
            Err(e) if e.is_infeasible() => Ok(U256::zero()),
            Err(e) => Err(e.into()),
        })
        .collect()
}

/// Whether the per-token amounts of a quote respect every hop limit.
pub fn within_limits(kind: SwapKind, amounts: &[U256], limits: &[U256]) -> bool {
    limits.iter().enumerate().all(|(i, limit)| match kind {
        SwapKind::GivenIn => amounts[i] <= *limit,
        SwapKind::GivenOut => amounts[i + 1] <= *limit,
    })
}

/// Translates the hop limits into a bound on the path's given amount.
///
/// `GivenIn` walks backwards: the input hop `i` needs to produce hop
/// `i + 1`'s maximum input, capped by hop `i`'s own limit. `GivenOut` walks
/// forwards the same way on outputs. A hop that cannot price the
/// translation keeps its own limit.
fn translate(path: &Path, kind: SwapKind, limits: &[U256]) -> U256 {
    let hops: Vec<_> = path.hops().collect();
    let last = hops.len() - 1;
    match kind {
        SwapKind::GivenIn => {
            let mut bound = limits[last];
            for i in (0..last).rev() {
                let (pool, tin, tout) = hops[i];
                let needed = pool.swap_given_out(tin, tout, bound).unwrap_or(limits[i]);
                bound = needed.min(limits[i]);
            }
            bound
        }
        SwapKind::GivenOut => {
            let mut bound = limits[0];
            for i in 1..=last {
                let (pool, tin, tout) = hops[i];
                let produced = pool.swap_given_in(tin, tout, bound).unwrap_or(limits[i]);
                bound = produced.min(limits[i]);
            }
            bound
        }
    }
}

/// The largest given amount, at most `amount_cap`, that the path carries
/// without any hop exceeding its limit. Zero when no such amount is found
/// within `steps` shrink iterations of doubling size.
pub fn path_limit(
    path: &Path,
    kind: SwapKind,
    limits: &[U256],
    amount_cap: U256,
    steps: usize,
) -> RouterResult<U256> {
    if limits.is_empty() || limits.iter().any(U256::is_zero) {
        return Ok(U256::zero());
    }
    let mut candidate = translate(path, kind, limits).min(amount_cap);
    // rounding can push a translated bound a few wei over a hop limit, so
    // start with a tiny step and double it
    let mut step = candidate / 10_000 + 1;
    for _ in 0..=steps {
        if candidate.is_zero() {
            break;
        }
        if let Some(amounts) = path.quote(kind, candidate)?
            && within_limits(kind, &amounts, limits)
        {
            trace!(pools = ?path.pool_ids(), limit = %candidate, "path limit");
            return Ok(candidate);
        }
        candidate = candidate.saturating_sub(step);
        step = step.saturating_mul(U256::from(2u8));
    }
    Ok(U256::zero())
}
