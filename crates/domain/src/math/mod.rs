//! Fixed-point math shared by every pool model.
//!
//! Unsigned 18-decimal values live in [`primitive_types::U256`]; the signed
//! geometry of the elliptical curves uses [`ethnum::I256`].

/// 18-decimal unsigned fixed point.
pub mod fixed_point;
/// `exp`, `ln` and `pow` over signed fixed point.
pub mod log_exp;
/// Raw/live/human amount conversions.
pub mod scaling;
/// Signed fixed point with 38-decimal extra precision.
pub mod signed;
/// Square roots.
pub mod sqrt;

pub use fixed_point::{FixedPoint, ONE, parse_u256, wei};
pub use scaling::{
    compute_rate_round_up, decimal_to_fixed, fixed_to_decimal, scaling_factor,
    to_raw_undo_rate_round_down, to_raw_undo_rate_round_up, to_scaled18_apply_rate_round_down,
    to_scaled18_apply_rate_round_up,
};
pub use signed::SignedFixedPoint;
