//! `reschain` - ordered resource acquisition with guaranteed reverse-order
//! teardown.
//!
//! Setting up a display stack, a storage engine, or any layered subsystem
//! means acquiring a strictly ordered sequence of dependent resources, each
//! of which only makes sense if the previous one succeeded. When a later
//! step fails, everything acquired so far must be released - in exact
//! reverse order - before the failure is reported. Hand-written cleanup
//! branches duplicate that teardown at every failure point and drift apart;
//! `reschain` replaces them with one explicit stack: push a resource and its
//! release operation on success, pop and release on failure. The
//! reverse-order invariant holds structurally instead of by repetition.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chain;
pub mod errors;
pub mod monitor;
pub mod report;
pub mod testing;
pub mod types;

pub use chain::{AcquireResult, Acquired, Chain, ChainState};
pub use errors::{ChainError, ChainResult, Diagnostic, ReleaseError, ReleaseFailure};
pub use report::FailureReport;
pub use types::{ChainId, StepName};
