//! Machine-readable failure reports.
//!
//! Binaries that drive a chain own user-visible reporting and exit-code
//! selection; this module gives them a structured record of one failed run
//! to emit alongside the human-readable diagnostic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{ChainError, ReleaseFailure};
use crate::types::{ChainId, StepName};

/// A structured record of one failed chain run.
///
/// Everything the error carries - which step failed, what the wrapped
/// library said, what was unwound on the way out - plus a wall-clock
/// timestamp for correlation with external logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// The chain run that failed.
    pub chain: ChainId,
    /// The step that failed to acquire.
    pub step: StepName,
    /// The underlying library's error text.
    pub diagnostic: String,
    /// Steps released during the unwind, in release order.
    pub unwound: Vec<StepName>,
    /// Release operations that failed during the unwind.
    pub release_failures: Vec<ReleaseFailure>,
    /// When the report was built.
    pub reported_at: DateTime<Utc>,
}

impl FailureReport {
    /// Builds a report from a chain error, stamped with the current time.
    pub fn from_error(err: &ChainError) -> Self {
        let ChainError::AcquisitionFailed {
            chain,
            step,
            diagnostic,
            unwound,
            release_failures,
        } = err;
        Self {
            chain: *chain,
            step: step.clone(),
            diagnostic: diagnostic.clone(),
            unwound: unwound.clone(),
            release_failures: release_failures.clone(),
            reported_at: Utc::now(),
        }
    }

    /// Renders the report as a JSON value.
    pub fn to_json(&self) -> Value {
        json!({
            "chain": self.chain,
            "step": self.step,
            "diagnostic": self.diagnostic,
            "unwound": self.unwound,
            "release_failures": self.release_failures,
            "reported_at": self.reported_at.to_rfc3339(),
        })
    }
}

impl From<&ChainError> for FailureReport {
    fn from(err: &ChainError) -> Self {
        Self::from_error(err)
    }
}
