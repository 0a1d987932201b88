//! Paths through the pool graph and paths with assigned amounts.

use crate::error::RouterResult;
use primitive_types::U256;
use sor_domain::enums::SwapKind;
use sor_domain::token::Token;
use sor_protocols::base_pool::BasePool;
use std::sync::Arc;

/// An ordered list of hops from the input token to the output token.
///
/// `tokens` has one more entry than `pools`: hop `i` trades `tokens[i]`
/// for `tokens[i + 1]` in `pools[i]`.
#[derive(Debug, Clone)]
pub struct Path {
    pub tokens: Vec<Token>,
    pub pools: Vec<Arc<dyn BasePool>>,
}

impl Path {
    pub fn new(tokens: Vec<Token>, pools: Vec<Arc<dyn BasePool>>) -> Self {
        debug_assert_eq!(tokens.len(), pools.len() + 1);
        Self { tokens, pools }
    }

    pub fn hop_count(&self) -> usize {
        self.pools.len()
    }

    pub fn token_in(&self) -> &Token {
        &self.tokens[0]
    }

    pub fn token_out(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    pub fn pool_ids(&self) -> Vec<&str> {
        self.pools.iter().map(|p| p.id()).collect()
    }

    /// `(pool, token_in, token_out)` per hop.
    pub fn hops(&self) -> impl Iterator<Item = (&dyn BasePool, &Token, &Token)> {
        self.pools
            .iter()
            .zip(self.tokens.windows(2))
            .map(|(pool, pair)| (pool.as_ref(), &pair[0], &pair[1]))
    }

    /// The weakest link's ranking liquidity.
    pub fn min_normalized_liquidity(&self) -> U256 {
        self.hops()
            .map(|(pool, tin, tout)| pool.get_normalized_liquidity(tin, tout))
            .min()
            .unwrap_or_default()
    }

    pub fn shares_pool_with(&self, other: &Path) -> bool {
        self.pools
            .iter()
            .any(|a| other.pools.iter().any(|b| a.id() == b.id()))
    }

    /// Token amounts at every step of the path for a given amount: the
    /// input amount first and the output amount last. `GivenIn` walks the
    /// hops forwards, `GivenOut` backwards.
    ///
    /// `None` when some hop cannot carry its amount.
    pub fn quote(&self, kind: SwapKind, amount: U256) -> RouterResult<Option<Vec<U256>>> {
        let hops: Vec<_> = self.hops().collect();
        let mut amounts = vec![U256::zero(); hops.len() + 1];
        match kind {
            SwapKind::GivenIn => {
                amounts[0] = amount;
                for (i, (pool, tin, tout)) in hops.iter().enumerate() {
                    match hop_amount(pool.swap_given_in(tin, tout, amounts[i]))? {
                        Some(out) => amounts[i + 1] = out,
                        None => return Ok(None),
                    }
                }
            }
            SwapKind::GivenOut => {
                amounts[hops.len()] = amount;
                for (i, (pool, tin, tout)) in hops.iter().enumerate().rev() {
                    match hop_amount(pool.swap_given_out(tin, tout, amounts[i + 1]))? {
                        Some(amount_in) => amounts[i] = amount_in,
                        None => return Ok(None),
                    }
                }
            }
        }
        Ok(Some(amounts))
    }
}

/// Maps a hop result: capacity failures and zero amounts mean "cannot
/// carry", anything else is a hard error.
pub(crate) fn hop_amount(result: sor_protocols::error::PoolResult<U256>) -> RouterResult<Option<U256>> {
    match result {
        Ok(amount) if amount.is_zero() => Ok(None),
        Ok(amount) => Ok(Some(amount)),
        Err(e) if e.is_infeasible() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A path with its share of the request.
#[derive(Debug, Clone)]
pub struct PathWithAmount {
    pub path: Path,
    pub kind: SwapKind,
    pub input_amount: U256,
    pub output_amount: U256,
    /// Amounts at every token of the path, as returned by [`Path::quote`].
    pub hop_amounts: Vec<U256>,
}

impl PathWithAmount {
    /// Prices `amount` along `path`; `None` when the path cannot carry it.
    pub fn new(path: Path, kind: SwapKind, amount: U256) -> RouterResult<Option<Self>> {
        let Some(hop_amounts) = path.quote(kind, amount)? else {
            return Ok(None);
        };
        let input_amount = hop_amounts[0];
        let output_amount = hop_amounts[hop_amounts.len() - 1];
        Ok(Some(Self {
            path,
            kind,
            input_amount,
            output_amount,
            hop_amounts,
        }))
    }

    /// The amount fixed by the request side.
    pub fn given_amount(&self) -> U256 {
        match self.kind {
            SwapKind::GivenIn => self.input_amount,
            SwapKind::GivenOut => self.output_amount,
        }
    }

    /// The amount the pools computed.
    pub fn calculated_amount(&self) -> U256 {
        match self.kind {
            SwapKind::GivenIn => self.output_amount,
            SwapKind::GivenOut => self.input_amount,
        }
    }
}
