//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use sor_router::prelude::*;
//! ```

pub use crate::config::TraversalConfig;
pub use crate::error::{RouterError, RouterResult};
pub use crate::graph::TokenGraph;
pub use crate::paths::{Path, PathWithAmount};
pub use crate::router::Router;
