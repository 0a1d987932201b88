//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use sor_engine::prelude::*;
//! ```

pub use crate::config::SorConfig;
pub use crate::error::{SorError, SorResult};
pub use crate::request::{SwapRequest, TraversalOverrides};
pub use crate::result::SwapResult;
pub use crate::sor::{BuiltPools, SkippedPool, Sor};

pub use sor_domain::entities::PoolSnapshot;
pub use sor_domain::enums::SwapKind;
pub use sor_domain::token::{Token, TokenAmount};
pub use sor_router::config::TraversalConfig;
