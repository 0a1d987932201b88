//! Pool model errors.

use sor_domain::error::MathError;
use thiserror::Error;

/// Errors raised by pool models and the settlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("token {0} not in pool")]
    TokenNotInPool(String),
    #[error(transparent)]
    Math(#[from] MathError),
    #[error("amount in exceeds the max in ratio")]
    MaxInRatio,
    #[error("amount out exceeds the max out ratio")]
    MaxOutRatio,
    #[error("trade exceeds the max trade size ratio")]
    MaxTradeSizeRatio,
    #[error("invariant ratio above maximum")]
    InvariantRatioAboveMax,
    #[error("invariant ratio below minimum")]
    InvariantRatioBelowMin,
    #[error("asset bounds exceeded")]
    AssetBoundsExceeded,
    #[error("amount out exceeds pool balance")]
    AmountOutExceedsBalance,
    #[error("unbalanced liquidity disabled")]
    UnbalancedLiquidityDisabled,
    #[error("hook refused the operation: {0}")]
    HookAdjustmentFailed(&'static str),
    #[error("swap fee above maximum")]
    SwapFeeTooHigh,
    #[error("missing pool data: {0}")]
    MissingData(&'static str),
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

impl PoolError {
    /// True when the error means "this hop cannot carry that amount" rather
    /// than a fault in the data or the arithmetic.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            PoolError::MaxInRatio
                | PoolError::MaxOutRatio
                | PoolError::MaxTradeSizeRatio
                | PoolError::InvariantRatioAboveMax
                | PoolError::InvariantRatioBelowMin
                | PoolError::AssetBoundsExceeded
                | PoolError::AmountOutExceedsBalance
                | PoolError::UnbalancedLiquidityDisabled
                | PoolError::HookAdjustmentFailed(_)
                | PoolError::SwapFeeTooHigh
        )
    }
}

/// Result alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(PoolError::MaxInRatio.is_infeasible());
        assert!(PoolError::UnbalancedLiquidityDisabled.is_infeasible());
        assert!(!PoolError::Math(MathError::Overflow).is_infeasible());
        assert!(!PoolError::TokenNotInPool("0xa".to_string()).is_infeasible());
    }
}
