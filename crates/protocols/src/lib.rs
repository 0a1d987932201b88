//! Pool models of the smart order router.
//!
//! Every model implements [`base_pool::BasePool`], the swap contract the
//! router relies on. Pools settled through the vault combine a
//! [`vault::PoolCurve`] with the [`vault::Vault`]; legacy pools settle
//! directly with their own fee and scaling conventions.

/// Prelude module for convenient imports.
pub mod prelude;

/// The shared swap contract.
pub mod base_pool;
/// ERC4626 wrap/unwrap buffers.
pub mod buffer;
/// Error types.
pub mod error;
/// Concentrated liquidity curves.
pub mod gyro;
/// Scaling and fee helpers of legacy pools.
pub mod legacy;
/// Weighted curve with time-varying weights.
pub mod quant_amm;
/// Readjusting virtual-balance curve.
pub mod reclamm;
/// StableSwap curves and legacy stable pools.
pub mod stable;
/// The settlement engine.
pub mod vault;
/// Vault-settled pools.
pub mod vault_pool;
/// Weighted curves and legacy weighted pools.
pub mod weighted;

#[cfg(test)]
mod test_pools;

use gyro::{Gyro2ClpCurve, GyroEclpCurve};
use quant_amm::QuantAmmCurve;
use reclamm::ReClammCurve;
use stable::StableCurve;
use vault_pool::VaultPool;
use weighted::WeightedCurve;

pub type WeightedPool = VaultPool<WeightedCurve>;
pub type StablePool = VaultPool<StableCurve>;
pub type Gyro2ClpPool = VaultPool<Gyro2ClpCurve>;
pub type GyroEclpPool = VaultPool<GyroEclpCurve>;
pub type QuantAmmPool = VaultPool<QuantAmmCurve>;
pub type ReClammPool = VaultPool<ReClammCurve>;
