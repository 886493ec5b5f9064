//! Ordered resource acquisition with reverse-order teardown.
//!
//! An acquisition chain executes a totally ordered sequence of steps. Each
//! step produces one resource paired with its release operation; the chain
//! pushes the pair onto an explicit stack. When a step fails, the chain pops
//! and releases everything acquired so far - in exact reverse acquisition
//! order - before surfacing the failure. The reverse-order invariant is
//! structural: release is only ever a pop, so it cannot be reordered or
//! skipped by a forgotten cleanup branch.
//!
//! ```
//! use reschain::{Acquired, Chain, ChainState, StepName};
//!
//! let state = Chain::new()
//!     .step(StepName::of("listener"), |_: &mut ChainState| {
//!         Ok(Acquired::released_by(vec![0u8; 4], drop))
//!     })
//!     .step(StepName::of("session"), |state: &mut ChainState| {
//!         let listener = state.resource::<Vec<u8>>();
//!         Ok(Acquired::released_by(listener.len(), drop))
//!     })
//!     .run()
//!     .expect("both steps succeed");
//!
//! assert_eq!(state.len(), 2);
//! assert_eq!(*state.resource::<usize>(), 4);
//! state.release().expect("releases are infallible here");
//! ```

use std::any::Any;

use tracing::{debug, warn};

use crate::errors::{ChainError, ChainResult, Diagnostic, ReleaseError, ReleaseFailure};
use crate::monitor::global_leak_monitor;
use crate::types::{ChainId, StepName};

/// Result of one acquisition step: the resource, or the wrapped library's
/// diagnostic text.
pub type AcquireResult<T> = Result<Acquired<T>, Diagnostic>;

type ReleaseFn<T> = Box<dyn FnOnce(T) -> Result<(), Diagnostic>>;

/// A freshly acquired resource paired with its release operation.
///
/// The release operation runs at most once: either during an unwind, during
/// caller-driven teardown, or when the chain state is dropped. Ownership of
/// the value moves into the release operation when it runs.
pub struct Acquired<T> {
    value: T,
    release: ReleaseFn<T>,
}

impl<T> Acquired<T> {
    /// Pairs a resource with an infallible release operation.
    ///
    /// For resources whose cleanup is their own `Drop` implementation, pass
    /// [`drop`] as the release operation.
    pub fn released_by(value: T, release: impl FnOnce(T) + 'static) -> Self {
        Self {
            value,
            release: Box::new(move |v| {
                release(v);
                Ok(())
            }),
        }
    }

    /// Pairs a resource with a release operation that can itself fail.
    ///
    /// A failed release never interrupts teardown; its diagnostic is
    /// aggregated into [`ChainError::AcquisitionFailed`] or
    /// [`ReleaseError`] depending on what drove the release.
    pub fn try_released_by(
        value: T,
        release: impl FnOnce(T) -> Result<(), Diagnostic> + 'static,
    ) -> Self {
        Self {
            value,
            release: Box::new(release),
        }
    }
}

/// Object-safe view of a held resource, erasing its concrete type so
/// heterogeneous resources can share one stack.
trait ErasedResource {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn release(self: Box<Self>) -> Result<(), Diagnostic>;
}

struct Slot<T> {
    value: T,
    release: ReleaseFn<T>,
}

impl<T: 'static> ErasedResource for Slot<T> {
    fn as_any(&self) -> &dyn Any {
        &self.value
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        &mut self.value
    }

    fn release(self: Box<Self>) -> Result<(), Diagnostic> {
        let slot = *self;
        (slot.release)(slot.value)
    }
}

struct HeldResource {
    name: StepName,
    handle_id: String,
    slot: Box<dyn ErasedResource>,
}

/// The ordered stack of resources held by an in-progress or completed run.
///
/// Invariant: exactly the prefix of steps that have succeeded has a live
/// resource here, and releasing only ever pops. Once release begins, no
/// further acquisition is attempted.
pub struct ChainState {
    id: ChainId,
    held: Vec<HeldResource>,
}

impl ChainState {
    fn new(id: ChainId) -> Self {
        Self {
            id,
            held: Vec::new(),
        }
    }

    /// The identifier of the run this state belongs to.
    pub const fn id(&self) -> ChainId {
        self.id
    }

    /// Number of resources currently held.
    pub fn len(&self) -> usize {
        self.held.len()
    }

    /// Whether the chain holds no resources.
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Step names of the held resources, in acquisition order.
    pub fn names(&self) -> Vec<StepName> {
        self.held.iter().map(|h| h.name.clone()).collect()
    }

    /// Looks up a held resource by type, scanning from the most recently
    /// acquired.
    pub fn try_resource<T: 'static>(&self) -> Option<&T> {
        self.held
            .iter()
            .rev()
            .find_map(|h| h.slot.as_any().downcast_ref::<T>())
    }

    /// Looks up a held resource by type.
    ///
    /// # Panics
    /// Panics if no resource of type `T` is held. Asking for a resource that
    /// an earlier step did not produce is a programming error at the call
    /// site, not a runtime failure mode.
    pub fn resource<T: 'static>(&self) -> &T {
        self.try_resource::<T>().unwrap_or_else(|| {
            panic!(
                "no resource of type {} held by chain {}",
                std::any::type_name::<T>(),
                self.id
            )
        })
    }

    /// Mutable variant of [`ChainState::resource`].
    ///
    /// # Panics
    /// Panics if no resource of type `T` is held.
    pub fn resource_mut<T: 'static>(&mut self) -> &mut T {
        let id = self.id;
        self.held
            .iter_mut()
            .rev()
            .find_map(|h| h.slot.as_any_mut().downcast_mut::<T>())
            .unwrap_or_else(|| {
                panic!(
                    "no resource of type {} held by chain {}",
                    std::any::type_name::<T>(),
                    id
                )
            })
    }

    /// Releases every held resource, in reverse acquisition order.
    ///
    /// Teardown is best-effort: a failed release operation is recorded and
    /// the remaining resources are still released. Returns the aggregate of
    /// release failures, if any occurred.
    pub fn release(mut self) -> Result<(), ReleaseError> {
        let failures = self.drain_reverse();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ReleaseError {
                chain: self.id,
                failures,
            })
        }
    }

    fn drain_reverse(&mut self) -> Vec<ReleaseFailure> {
        let mut failures = Vec::new();
        while let Some(held) = self.held.pop() {
            debug!(chain = %self.id, step = %held.name, "releasing resource");
            global_leak_monitor().record_release(&held.handle_id);
            if let Err(diagnostic) = held.slot.release() {
                warn!(
                    chain = %self.id,
                    step = %held.name,
                    %diagnostic,
                    "release failed, continuing teardown"
                );
                failures.push(ReleaseFailure {
                    step: held.name,
                    diagnostic,
                });
            }
        }
        failures
    }
}

impl Drop for ChainState {
    fn drop(&mut self) {
        if self.held.is_empty() {
            return;
        }
        warn!(
            chain = %self.id,
            held = self.held.len(),
            "chain state dropped with live resources, releasing in reverse order"
        );
        let _failures = self.drain_reverse();
    }
}

impl std::fmt::Debug for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainState")
            .field("id", &self.id)
            .field("held", &self.names())
            .finish()
    }
}

type StepFn = Box<dyn FnOnce(&mut ChainState) -> Result<Box<dyn ErasedResource>, Diagnostic>>;

struct Step {
    name: StepName,
    acquire: StepFn,
}

/// Builder for an ordered acquisition chain.
///
/// Steps run in registration order; each receives the [`ChainState`] holding
/// every resource acquired so far. A zero-step chain succeeds immediately
/// with an empty state.
pub struct Chain {
    id: ChainId,
    steps: Vec<Step>,
}

impl Chain {
    /// Creates an empty chain with a fresh [`ChainId`].
    pub fn new() -> Self {
        Self {
            id: ChainId::new(),
            steps: Vec::new(),
        }
    }

    /// The identifier this chain's run will carry.
    pub const fn id(&self) -> ChainId {
        self.id
    }

    /// Appends an acquisition step.
    ///
    /// The step may read (and mutate) resources from earlier steps through
    /// the state it receives. On failure it returns the wrapped library's
    /// diagnostic text.
    pub fn step<T, F>(mut self, name: StepName, acquire: F) -> Self
    where
        T: 'static,
        F: FnOnce(&mut ChainState) -> AcquireResult<T> + 'static,
    {
        let wrapped: StepFn = Box::new(move |state| {
            acquire(state).map(|acquired| {
                Box::new(Slot {
                    value: acquired.value,
                    release: acquired.release,
                }) as Box<dyn ErasedResource>
            })
        });
        self.steps.push(Step {
            name,
            acquire: wrapped,
        });
        self
    }

    /// Runs every step in order.
    ///
    /// On success, ownership of all held resources transfers to the caller
    /// via the returned [`ChainState`]; dropping it (or calling
    /// [`ChainState::release`]) releases them in reverse acquisition order.
    ///
    /// On the first failing step, no further step runs; everything acquired
    /// so far is released in reverse order, and the failure is returned with
    /// the failing step's name and diagnostic.
    pub fn run(self) -> ChainResult<ChainState> {
        let mut state = ChainState::new(self.id);
        debug!(chain = %self.id, steps = self.steps.len(), "running acquisition chain");

        for step in self.steps {
            debug!(chain = %self.id, step = %step.name, "acquiring resource");
            match (step.acquire)(&mut state) {
                Ok(slot) => {
                    let handle_id = global_leak_monitor().record_acquisition(self.id, &step.name);
                    state.held.push(HeldResource {
                        name: step.name,
                        handle_id,
                        slot,
                    });
                }
                Err(diagnostic) => {
                    warn!(
                        chain = %self.id,
                        step = %step.name,
                        %diagnostic,
                        "acquisition failed, unwinding"
                    );
                    let unwound: Vec<StepName> =
                        state.held.iter().rev().map(|h| h.name.clone()).collect();
                    let release_failures = state.drain_reverse();
                    return Err(ChainError::AcquisitionFailed {
                        chain: self.id,
                        step: step.name,
                        diagnostic,
                        unwound,
                        release_failures,
                    });
                }
            }
        }

        debug!(chain = %self.id, held = state.len(), "acquisition chain complete");
        Ok(state)
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&StepName> = self.steps.iter().map(|s| &s.name).collect();
        f.debug_struct("Chain")
            .field("id", &self.id)
            .field("steps", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{ProbeLog, ProbeResource};

    #[test]
    fn empty_chain_succeeds_with_empty_state() {
        let state = Chain::new().run().unwrap();
        assert!(state.is_empty());
        assert_eq!(state.len(), 0);
        state.release().unwrap();
    }

    #[test]
    fn later_steps_see_earlier_resources() {
        let state = Chain::new()
            .step(StepName::of("base"), |_: &mut ChainState| {
                Ok(Acquired::released_by(21u32, drop))
            })
            .step(StepName::of("derived"), |state: &mut ChainState| {
                let base = state.resource::<u32>();
                Ok(Acquired::released_by(u64::from(*base) * 2, drop))
            })
            .run()
            .unwrap();

        assert_eq!(*state.resource::<u64>(), 42);
        assert_eq!(
            state.names(),
            vec![StepName::of("base"), StepName::of("derived")]
        );
    }

    #[test]
    fn steps_can_mutate_earlier_resources() {
        let state = Chain::new()
            .step(StepName::of("buffer"), |_: &mut ChainState| {
                Ok(Acquired::released_by(Vec::<u8>::new(), drop))
            })
            .step(StepName::of("writer"), |state: &mut ChainState| {
                state.resource_mut::<Vec<u8>>().push(7);
                Ok(Acquired::released_by((), drop))
            })
            .run()
            .unwrap();

        assert_eq!(state.resource::<Vec<u8>>(), &[7]);
    }

    #[test]
    fn duplicate_step_names_are_permitted() {
        let log = ProbeLog::new();
        let name = StepName::of("worker");
        let state = Chain::new()
            .step(name.clone(), {
                let log = log.clone();
                let name = name.clone();
                move |_: &mut ChainState| Ok(ProbeResource::acquired(name, &log))
            })
            .step(name.clone(), {
                let log = log.clone();
                let name = name.clone();
                move |_: &mut ChainState| Ok(ProbeResource::acquired(name, &log))
            })
            .run()
            .unwrap();

        assert_eq!(state.len(), 2);
        state.release().unwrap();
        assert_eq!(log.release_count(&name), 2);
    }

    #[test]
    #[should_panic(expected = "no resource of type")]
    fn missing_resource_is_a_precondition_violation() {
        let state = Chain::new().run().unwrap();
        let _ = state.resource::<u32>();
    }

    #[test]
    fn dropping_state_releases_in_reverse_order() {
        let log = ProbeLog::new();
        let names = [StepName::of("first"), StepName::of("second")];
        {
            let _state = Chain::new()
                .step(names[0].clone(), {
                    let log = log.clone();
                    let name = names[0].clone();
                    move |_: &mut ChainState| Ok(ProbeResource::acquired(name, &log))
                })
                .step(names[1].clone(), {
                    let log = log.clone();
                    let name = names[1].clone();
                    move |_: &mut ChainState| Ok(ProbeResource::acquired(name, &log))
                })
                .run()
                .unwrap();
        }
        assert_eq!(log.released(), vec![names[1].clone(), names[0].clone()]);
    }

    #[test]
    fn failed_release_does_not_stop_teardown() {
        let log = ProbeLog::new();
        let state = Chain::new()
            .step(StepName::of("stable"), {
                let log = log.clone();
                move |_: &mut ChainState| Ok(ProbeResource::acquired(StepName::of("stable"), &log))
            })
            .step(StepName::of("fragile"), |_: &mut ChainState| {
                Ok(Acquired::try_released_by((), |()| {
                    Err("device already gone".to_string())
                }))
            })
            .run()
            .unwrap();

        let err = state.release().unwrap_err();
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].step.as_ref(), "fragile");
        assert_eq!(err.failures[0].diagnostic, "device already gone");
        // The stable resource below the fragile one was still released.
        assert_eq!(log.release_count(&StepName::of("stable")), 1);
    }
}
