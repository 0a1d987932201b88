use crate::base_pool::{BasePool, find_pool_token};
use crate::error::{PoolError, PoolResult};
use crate::legacy::{downscale_down, downscale_up, upscale, upscaled_balances};
use crate::stable::{legacy_limit, legacy_swap, math};
use primitive_types::U256;
use sor_domain::enums::{PoolType, SwapKind};
use sor_domain::math::{FixedPoint, ONE};
use sor_domain::pool::{PoolToken, TokenPairLiquidity, lookup_pair_liquidity};
use sor_domain::token::Token;

/// Joins may mint up to this share of the current supply in one trade.
const MAX_JOIN_SUPPLY_RATIO: U256 = U256([300_000_000_000_000_000, 0, 0, 0]);

/// Legacy stable pool whose own BPT sits in its token list and trades like
/// any other token through single-token joins and exits.
#[derive(Debug, Clone)]
pub struct ComposableStablePool {
    id: String,
    address: String,
    tokens: Vec<PoolToken>,
    bpt_index: usize,
    amp: U256,
    swap_fee: U256,
    total_supply: U256,
    pair_liquidity: Vec<TokenPairLiquidity>,
}

/// One side of a trade: the pool token and its position among the
/// non-BPT balances, `None` for the BPT itself.
type Side<'a> = (&'a PoolToken, Option<usize>);

impl ComposableStablePool {
    /// `tokens` includes the BPT at the index matching the pool address;
    /// `total_supply` is the BPT supply held outside the pool.
    pub fn new(
        id: impl Into<String>,
        address: &str,
        tokens: Vec<PoolToken>,
        amp: U256,
        swap_fee: U256,
        total_supply: U256,
    ) -> PoolResult<Self> {
        let address = address.to_ascii_lowercase();
        let bpt_index = tokens
            .iter()
            .position(|t| t.token.is_address(&address))
            .ok_or(PoolError::MissingData("bpt token"))?;
        Ok(Self {
            id: id.into(),
            address,
            tokens,
            bpt_index,
            amp,
            swap_fee,
            total_supply,
            pair_liquidity: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_pair_liquidity(mut self, pairs: Vec<TokenPairLiquidity>) -> Self {
        self.pair_liquidity = pairs;
        self
    }

    fn non_bpt_tokens(&self) -> impl Iterator<Item = &PoolToken> {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.bpt_index)
            .map(|(_, t)| t)
    }

    fn balances(&self) -> PoolResult<Vec<U256>> {
        upscaled_balances(self.non_bpt_tokens())
    }

    fn side(&self, token: &Token) -> PoolResult<Side<'_>> {
        let pool_token = find_pool_token(&self.tokens, token)?;
        let position = self.tokens.iter().position(|t| t.token == pool_token.token);
        Ok(match position {
            Some(i) if i == self.bpt_index => (pool_token, None),
            Some(i) if i > self.bpt_index => (pool_token, Some(i - 1)),
            Some(i) => (pool_token, Some(i)),
            None => return Err(PoolError::TokenNotInPool(token.address.clone())),
        })
    }

    fn one_hot(&self, index: usize, amount: U256) -> Vec<U256> {
        let mut amounts = vec![U256::zero(); self.tokens.len() - 1];
        amounts[index] = amount;
        amounts
    }

    fn swap(&self, kind: SwapKind, token_in: &Token, token_out: &Token, amount: U256) -> PoolResult<U256> {
        let (tin, in_index) = self.side(token_in)?;
        let (tout, out_index) = self.side(token_out)?;
        if amount.is_zero() {
            return Ok(U256::zero());
        }
        let balances = self.balances()?;

        match (in_index, out_index) {
            (Some(i), Some(o)) => legacy_swap(
                self.amp,
                &balances,
                (tin, i),
                (tout, o),
                kind,
                amount,
                self.swap_fee,
            ),
            (Some(i), None) => {
                let invariant = math::compute_invariant(self.amp, &balances)?;
                match kind {
                    SwapKind::GivenIn => {
                        let amounts_in = self.one_hot(i, upscale(amount, tin)?);
                        let bpt_out = math::bpt_out_given_exact_tokens_in(
                            self.amp,
                            &balances,
                            &amounts_in,
                            self.total_supply,
                            invariant,
                            self.swap_fee,
                        )?;
                        downscale_down(bpt_out, tout)
                    }
                    SwapKind::GivenOut => {
                        let amount_in = math::token_in_given_exact_bpt_out(
                            self.amp,
                            &balances,
                            i,
                            upscale(amount, tout)?,
                            self.total_supply,
                            invariant,
                            self.swap_fee,
                        )?;
                        downscale_up(amount_in, tin)
                    }
                }
            }
            (None, Some(o)) => {
                let invariant = math::compute_invariant(self.amp, &balances)?;
                match kind {
                    SwapKind::GivenIn => {
                        let amount_out = math::token_out_given_exact_bpt_in(
                            self.amp,
                            &balances,
                            o,
                            upscale(amount, tin)?,
                            self.total_supply,
                            invariant,
                            self.swap_fee,
                        )?;
                        downscale_down(amount_out, tout)
                    }
                    SwapKind::GivenOut => {
                        let amounts_out = self.one_hot(o, upscale(amount, tout)?);
                        let bpt_in = math::bpt_in_given_exact_tokens_out(
                            self.amp,
                            &balances,
                            &amounts_out,
                            self.total_supply,
                            invariant,
                            self.swap_fee,
                        )?;
                        downscale_up(bpt_in, tin)
                    }
                }
            }
            (None, None) => Err(PoolError::TokenNotInPool(token_out.address.clone())),
        }
    }
}

impl BasePool for ComposableStablePool {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn pool_type(&self) -> PoolType {
        PoolType::ComposableStable
    }

    fn swap_fee(&self) -> U256 {
        self.swap_fee
    }

    fn tokens(&self) -> &[PoolToken] {
        &self.tokens
    }

    fn swap_given_in(&self, token_in: &Token, token_out: &Token, amount_in: U256) -> PoolResult<U256> {
        self.swap(SwapKind::GivenIn, token_in, token_out, amount_in)
    }

    fn swap_given_out(
        &self,
        token_in: &Token,
        token_out: &Token,
        amount_out: U256,
    ) -> PoolResult<U256> {
        self.swap(SwapKind::GivenOut, token_in, token_out, amount_out)
    }

    fn get_limit_amount_swap(
        &self,
        token_in: &Token,
        token_out: &Token,
        kind: SwapKind,
    ) -> PoolResult<U256> {
        let (tin, in_index) = self.side(token_in)?;
        let (tout, out_index) = self.side(token_out)?;
        match (in_index, out_index, kind) {
            (Some(_), Some(_), _) => legacy_limit(tin, tout, kind),
            // join: the whole balance in, or a slice of supply out
            (Some(_), None, SwapKind::GivenIn) => Ok(tin.balance),
            (Some(_), None, SwapKind::GivenOut) => Ok(self.total_supply.mul_down(MAX_JOIN_SUPPLY_RATIO)?),
            // exit: half of the token's share of supply, or half its balance
            (None, Some(_), SwapKind::GivenIn) => {
                let balances = self.balances()?;
                let total = balances
                    .iter()
                    .try_fold(U256::zero(), |acc, b| acc.try_add(*b))?;
                let share = upscale(tout.balance, tout)?.div_down(total)?;
                Ok(self.total_supply.mul_down(share)?.mul_down(ONE / 2)?)
            }
            (None, Some(_), SwapKind::GivenOut) => Ok(tout.balance / 2),
            (None, None, _) => Err(PoolError::TokenNotInPool(token_out.address.clone())),
        }
    }

    fn get_normalized_liquidity(&self, token_in: &Token, token_out: &Token) -> U256 {
        let from_snapshot =
            lookup_pair_liquidity(&self.pair_liquidity, &token_in.address, &token_out.address);
        if !from_snapshot.is_zero() {
            return from_snapshot;
        }
        match self.side(token_out) {
            Ok((_, None)) => self.total_supply,
            Ok((tout, Some(_))) => upscale(tout.balance, tout).unwrap_or_default(),
            Err(_) => U256::zero(),
        }
    }
}
