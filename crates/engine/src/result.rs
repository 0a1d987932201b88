//! Routed swap summaries.

use primitive_types::U256;
use rust_decimal::Decimal;
use sor_domain::enums::SwapKind;
use sor_domain::token::{Token, TokenAmount};
use sor_router::paths::PathWithAmount;

/// The chosen paths of a routed swap and their totals.
#[derive(Debug, Clone)]
pub struct SwapResult {
    pub kind: SwapKind,
    pub paths: Vec<PathWithAmount>,
    pub input_amount: TokenAmount,
    pub output_amount: TokenAmount,
}

impl SwapResult {
    /// Sums the per-path amounts.
    pub fn new(kind: SwapKind, token_in: Token, token_out: Token, paths: Vec<PathWithAmount>) -> Self {
        let input = paths
            .iter()
            .fold(U256::zero(), |acc, p| acc.saturating_add(p.input_amount));
        let output = paths
            .iter()
            .fold(U256::zero(), |acc, p| acc.saturating_add(p.output_amount));
        Self {
            kind,
            paths,
            input_amount: TokenAmount::from_raw(token_in, input),
            output_amount: TokenAmount::from_raw(token_out, output),
        }
    }

    /// Output per unit of input in human units; `None` for an empty input
    /// or amounts beyond `Decimal`.
    pub fn effective_price(&self) -> Option<Decimal> {
        let input = self.input_amount.to_human()?;
        let output = self.output_amount.to_human()?;
        if input.is_zero() {
            return None;
        }
        output.checked_div(input)
    }

    pub fn hop_count(&self) -> usize {
        self.paths.iter().map(|p| p.path.hop_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_effective_price_across_decimals() {
        let weth = Token::new(1, "0xweth", 18);
        let usdc = Token::new(1, "0xusdc", 6);
        let result = SwapResult {
            kind: SwapKind::GivenIn,
            paths: Vec::new(),
            // 2 WETH for 5000 USDC
            input_amount: TokenAmount::from_raw(weth, U256::from(2_000_000_000_000_000_000u64)),
            output_amount: TokenAmount::from_raw(usdc, U256::from(5_000_000_000u64)),
        };
        assert_eq!(result.effective_price(), Some(dec!(2500)));
    }

    #[test]
    fn test_effective_price_without_input() {
        let token = Token::new(1, "0xa", 18);
        let result = SwapResult::new(SwapKind::GivenIn, token.clone(), token, Vec::new());
        assert_eq!(result.effective_price(), None);
    }
}
