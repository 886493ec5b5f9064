//! Testing utilities for the `reschain` library.
//!
//! The utilities are organized into submodules:
//!
//! - [`fixtures`]: probe resources, release-order logs, and scripted chains
//! - [`assertions`]: custom assertions for the ordering and at-most-once
//!   invariants
//! - `generators`: property test generators (behind the `testing` feature)
//!
//! ```
//! use reschain::testing::fixtures::{scripted_chain, step_names, ProbeLog};
//!
//! let log = ProbeLog::new();
//! let err = scripted_chain(3, Some(2), "boom", &log).run().unwrap_err();
//! assert_eq!(err.step(), &step_names(3)[1]);
//! ```

pub mod assertions;
pub mod fixtures;

#[cfg(feature = "testing")]
pub mod generators;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::assertions::*;
    pub use super::fixtures::*;

    #[cfg(feature = "testing")]
    pub use super::generators::*;
}
