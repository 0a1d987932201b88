//! Swap requests.

use crate::error::{SorError, SorResult};
use serde::{Deserialize, Serialize};
use sor_domain::enums::SwapKind;
use sor_domain::token::{Token, TokenAmount};
use sor_router::config::TraversalConfig;

/// Per-request replacements for the configured traversal bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalOverrides {
    pub max_hops: Option<usize>,
    pub max_candidates: Option<usize>,
    pub max_paths: Option<usize>,
    pub limit_refinement_steps: Option<usize>,
}

impl TraversalOverrides {
    /// `base` with every set override applied.
    pub fn apply(&self, base: TraversalConfig) -> TraversalConfig {
        TraversalConfig {
            max_hops: self.max_hops.unwrap_or(base.max_hops),
            max_candidates: self.max_candidates.unwrap_or(base.max_candidates),
            max_paths: self.max_paths.unwrap_or(base.max_paths),
            limit_refinement_steps: self
                .limit_refinement_steps
                .unwrap_or(base.limit_refinement_steps),
        }
    }
}

/// A swap to route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub token_in: Token,
    pub token_out: Token,
    pub kind: SwapKind,
    /// Denominated in `token_in` for `GivenIn`, in `token_out` for
    /// `GivenOut`.
    pub amount: TokenAmount,
    /// Unix seconds at which time-dependent pools are evaluated.
    pub timestamp: u64,
    #[serde(default)]
    pub overrides: TraversalOverrides,
}

impl SwapRequest {
    pub fn new(token_in: Token, token_out: Token, kind: SwapKind, amount: TokenAmount, timestamp: u64) -> Self {
        Self {
            token_in,
            token_out,
            kind,
            amount,
            timestamp,
            overrides: TraversalOverrides::default(),
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: TraversalOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// The token the amount must be denominated in.
    pub fn given_token(&self) -> &Token {
        match self.kind {
            SwapKind::GivenIn => &self.token_in,
            SwapKind::GivenOut => &self.token_out,
        }
    }

    pub fn validate(&self) -> SorResult<()> {
        let expected = self.given_token();
        if &self.amount.token != expected {
            return Err(SorError::AmountTokenMismatch {
                expected: expected.address.clone(),
                actual: self.amount.token.address.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    fn weth() -> Token {
        Token::new(1, "0xweth", 18)
    }

    fn usdc() -> Token {
        Token::new(1, "0xusdc", 6)
    }

    #[test]
    fn test_amount_must_match_given_side() {
        let amount = TokenAmount::from_raw(weth(), U256::from(1u64));
        let given_in = SwapRequest::new(weth(), usdc(), SwapKind::GivenIn, amount.clone(), 0);
        assert!(given_in.validate().is_ok());

        let given_out = SwapRequest::new(weth(), usdc(), SwapKind::GivenOut, amount, 0);
        assert_eq!(
            given_out.validate(),
            Err(SorError::AmountTokenMismatch {
                expected: "0xusdc".to_string(),
                actual: "0xweth".to_string()
            })
        );
    }

    #[test]
    fn test_overrides_replace_only_what_is_set() {
        let overrides = TraversalOverrides {
            max_hops: Some(2),
            max_paths: Some(1),
            ..Default::default()
        };
        let config = overrides.apply(TraversalConfig::default());
        assert_eq!(config.max_hops, 2);
        assert_eq!(config.max_paths, 1);
        assert_eq!(config.max_candidates, TraversalConfig::default().max_candidates);
    }

    #[test]
    fn test_request_json_without_overrides() {
        let request = SwapRequest::new(
            weth(),
            usdc(),
            SwapKind::GivenIn,
            TokenAmount::from_raw(weth(), U256::from(5u64)),
            1_700_000_000,
        );
        let mut json = serde_json::to_value(&request).unwrap();
        json.as_object_mut().unwrap().remove("overrides");
        let parsed: SwapRequest = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, request);
    }
}
