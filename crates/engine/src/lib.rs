//! Smart order router facade.
//!
//! [`Sor`] turns a snapshot of pool records into pool models at the
//! request's timestamp and asks the router for the best split of a swap.
//!
//! # Example
//!
//! ```rust,no_run
//! use sor_engine::prelude::*;
//!
//! fn quote(snapshot: &PoolSnapshot, request: &SwapRequest) -> SorResult<()> {
//!     let sor = Sor::new(SorConfig::default());
//!     match sor.get_swap_paths(request, snapshot)? {
//!         Some(result) => println!("{} -> {}", result.input_amount, result.output_amount),
//!         None => println!("no route"),
//!     }
//!     Ok(())
//! }
//! ```

/// Prelude module for convenient imports.
pub mod prelude;

/// Facade configuration.
pub mod config;
/// Error types.
pub mod error;
/// Pool models from snapshot records.
pub mod factory;
/// Swap requests.
pub mod request;
/// Swap results.
pub mod result;
/// The facade.
pub mod sor;

pub use sor::Sor;
