//! Concentrated liquidity curves: the two-token range and the ellipse.

mod eclp;
pub mod eclp_math;
pub mod two_clp;

pub use eclp::{GyroEclpCurve, LegacyGyroEclpPool};
pub use eclp_math::{DerivedEclpParams, EclpParams, Vector2};
pub use two_clp::Gyro2ClpCurve;
