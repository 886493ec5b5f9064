//! Probe resources and scripted chains for exercising acquisition order,
//! release order, and the at-most-once release invariant.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::chain::{Acquired, Chain, ChainState};
use crate::types::StepName;

#[derive(Debug, Default)]
struct ProbeLogInner {
    invocations: Vec<StepName>,
    released: Vec<StepName>,
    release_counts: HashMap<StepName, usize>,
}

/// Shared recorder of step invocations and resource releases across one
/// chain run.
///
/// Cloning produces another handle to the same log, so a log can be
/// captured by every step of a chain and inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProbeLog {
    inner: Arc<Mutex<ProbeLogInner>>,
}

impl ProbeLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a step's acquisition function was invoked.
    pub fn record_invocation(&self, step: &StepName) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.invocations.push(step.clone());
        }
    }

    /// Records that a resource was released.
    pub fn record_release(&self, step: &StepName) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.released.push(step.clone());
            *inner.release_counts.entry(step.clone()).or_insert(0) += 1;
        }
    }

    /// Step invocations, in invocation order.
    pub fn invocations(&self) -> Vec<StepName> {
        self.inner
            .lock()
            .map_or_else(|_| Vec::new(), |inner| inner.invocations.clone())
    }

    /// Releases, in release order.
    pub fn released(&self) -> Vec<StepName> {
        self.inner
            .lock()
            .map_or_else(|_| Vec::new(), |inner| inner.released.clone())
    }

    /// How many times the named resource was released.
    pub fn release_count(&self, step: &StepName) -> usize {
        self.inner.lock().map_or(0, |inner| {
            inner.release_counts.get(step).copied().unwrap_or(0)
        })
    }

    /// Total number of releases recorded.
    pub fn total_releases(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.released.len())
    }
}

/// A resource that records its own release into a [`ProbeLog`].
#[derive(Debug)]
pub struct ProbeResource {
    step: StepName,
    log: ProbeLog,
}

impl ProbeResource {
    /// Builds an acquired probe resource whose release operation records
    /// `step` into `log`.
    pub fn acquired(step: StepName, log: &ProbeLog) -> Acquired<Self> {
        let resource = Self {
            step,
            log: log.clone(),
        };
        Acquired::released_by(resource, |r| r.log.record_release(&r.step))
    }

    /// The step this probe was acquired under.
    pub const fn step(&self) -> &StepName {
        &self.step
    }
}

/// Step names `step-1` through `step-{count}`.
pub fn step_names(count: usize) -> Vec<StepName> {
    (1..=count)
        .map(|i| StepName::of(&format!("step-{i}")))
        .collect()
}

/// Builds a chain of `total` probe steps where the step at 1-based position
/// `fail_at` (if any) fails with `diagnostic` instead of acquiring.
///
/// Every step records its invocation into `log` on entry, so tests can
/// assert that nothing past the failure point ever ran.
pub fn scripted_chain(
    total: usize,
    fail_at: Option<usize>,
    diagnostic: &str,
    log: &ProbeLog,
) -> Chain {
    let mut chain = Chain::new();
    for (index, name) in step_names(total).into_iter().enumerate() {
        let position = index + 1;
        let fails = fail_at == Some(position);
        let diagnostic = diagnostic.to_string();
        let log = log.clone();
        let step = name.clone();
        chain = chain.step(name, move |_: &mut ChainState| {
            log.record_invocation(&step);
            if fails {
                Err(diagnostic)
            } else {
                Ok(ProbeResource::acquired(step, &log))
            }
        });
    }
    chain
}
