//! Error types for `reschain`.
//!
//! The error design follows these principles:
//!
//! - **Single failure kind**: an acquisition chain fails in exactly one way -
//!   a step could not acquire its resource. Everything else (which step, what
//!   the underlying library said, what was unwound) is context on that kind.
//! - **Unwind evidence**: the error records what was released on the way out,
//!   so callers and tests can verify that nothing leaked.
//! - **Release failures are secondary**: a failed release operation never
//!   masks the acquisition failure that triggered the unwind, and never stops
//!   the unwind. It is aggregated alongside.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ChainId, StepName};

/// Diagnostic text reported by an acquisition or release primitive.
///
/// Wrapped libraries report failures as free-form text (the moral equivalent
/// of a C `GetError()` string), so the chain carries diagnostics verbatim.
pub type Diagnostic = String;

/// Errors that can occur while running an acquisition chain.
///
/// There is no retry policy: every acquisition failure is fatal to the run.
/// By the time a `ChainError` reaches the caller, the unwind has already
/// completed - every previously acquired resource has been released, in
/// reverse acquisition order.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A step failed to acquire its resource.
    #[error("acquisition failed at step '{step}': {diagnostic}")]
    AcquisitionFailed {
        /// The chain run the failure belongs to.
        chain: ChainId,
        /// The step that failed.
        step: StepName,
        /// The underlying library's error text.
        diagnostic: Diagnostic,
        /// Steps whose resources were released during the unwind, in release
        /// order (reverse acquisition order).
        unwound: Vec<StepName>,
        /// Release operations that themselves failed during the unwind.
        /// The unwind continued past each of them.
        release_failures: Vec<ReleaseFailure>,
    },
}

impl ChainError {
    /// The chain run this error belongs to.
    pub const fn chain(&self) -> ChainId {
        match self {
            Self::AcquisitionFailed { chain, .. } => *chain,
        }
    }

    /// The step that failed to acquire.
    pub const fn step(&self) -> &StepName {
        match self {
            Self::AcquisitionFailed { step, .. } => step,
        }
    }

    /// The underlying library's error text.
    pub fn diagnostic(&self) -> &str {
        match self {
            Self::AcquisitionFailed { diagnostic, .. } => diagnostic,
        }
    }
}

/// Type alias for chain operation results.
pub type ChainResult<T> = Result<T, ChainError>;

/// One release operation that failed during teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFailure {
    /// The step whose resource failed to release.
    pub step: StepName,
    /// The underlying library's error text.
    pub diagnostic: Diagnostic,
}

impl std::fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "release of '{}' failed: {}", self.step, self.diagnostic)
    }
}

/// Aggregate error returned by caller-driven teardown when one or more
/// release operations fail.
///
/// Teardown is best-effort: every held resource is offered to its release
/// operation exactly once regardless of earlier failures, so `failures`
/// never implies a skipped release.
#[derive(Debug, Error)]
#[error("release failed for {} resource(s) in chain {chain}", .failures.len())]
pub struct ReleaseError {
    /// The chain run the failures belong to.
    pub chain: ChainId,
    /// The release operations that failed, in release order.
    pub failures: Vec<ReleaseFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_error_display_names_step_and_diagnostic() {
        let err = ChainError::AcquisitionFailed {
            chain: ChainId::new(),
            step: StepName::of("renderer"),
            diagnostic: "no suitable video driver".to_string(),
            unwound: vec![StepName::of("window"), StepName::of("display")],
            release_failures: Vec::new(),
        };
        assert_eq!(
            err.to_string(),
            "acquisition failed at step 'renderer': no suitable video driver"
        );
        assert_eq!(err.step().as_ref(), "renderer");
        assert_eq!(err.diagnostic(), "no suitable video driver");
    }

    #[test]
    fn release_error_display_counts_failures() {
        let chain = ChainId::new();
        let err = ReleaseError {
            chain,
            failures: vec![ReleaseFailure {
                step: StepName::of("texture"),
                diagnostic: "device lost".to_string(),
            }],
        };
        assert_eq!(
            err.to_string(),
            format!("release failed for 1 resource(s) in chain {chain}")
        );
    }
}
