pub mod convert;
pub mod hook;
pub mod pool;
pub mod snapshot;
pub mod token;

// Re-export for easier access
pub use convert::{parse_fixed, parse_fixed18};
pub use hook::{HookParams, HookRecord};
pub use pool::{
    Gyro2ClpParams, GyroEclpParams, LiquidityManagement, PairLiquidityRecord, PoolRecord,
    QuantAmmParams, ReClammParams,
};
pub use snapshot::PoolSnapshot;
pub use token::{PoolTokenRecord, UnderlyingTokenRecord};
