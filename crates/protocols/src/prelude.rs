//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use sor_protocols::prelude::*;
//! ```

// Contract
pub use crate::base_pool::BasePool;
pub use crate::error::{PoolError, PoolResult};

// Pools
pub use crate::buffer::BufferPool;
pub use crate::gyro::LegacyGyroEclpPool;
pub use crate::stable::{ComposableStablePool, MetaStablePool};
pub use crate::vault_pool::VaultPool;
pub use crate::weighted::LegacyWeightedPool;
pub use crate::{Gyro2ClpPool, GyroEclpPool, QuantAmmPool, ReClammPool, StablePool, WeightedPool};

// Curves
pub use crate::gyro::{DerivedEclpParams, EclpParams, Gyro2ClpCurve, GyroEclpCurve, Vector2};
pub use crate::quant_amm::{QuantAmmCurve, WeightSchedule};
pub use crate::reclamm::{ReClammCurve, ReClammState};
pub use crate::stable::StableCurve;
pub use crate::weighted::WeightedCurve;

// Settlement
pub use crate::vault::{PoolCurve, PoolState, Vault};
