//! Custom assertions for the chain's ordering and at-most-once invariants.

use crate::testing::fixtures::ProbeLog;
use crate::types::StepName;

/// Asserts that releases happened in exactly `expected` order.
///
/// # Panics
/// Panics if the recorded release order differs.
pub fn assert_release_order(log: &ProbeLog, expected: &[StepName]) {
    let released = log.released();
    assert_eq!(
        released, expected,
        "release order mismatch: released {released:?}, expected {expected:?}"
    );
}

/// Asserts that releases happened in exact reverse order of `acquired`.
///
/// # Panics
/// Panics if any release is missing, duplicated, or out of order.
pub fn assert_released_in_reverse(log: &ProbeLog, acquired: &[StepName]) {
    let expected: Vec<StepName> = acquired.iter().rev().cloned().collect();
    assert_release_order(log, &expected);
}

/// Asserts that each step in `steps` had its release operation called
/// exactly once.
///
/// # Panics
/// Panics on a zero or repeated release.
pub fn assert_released_exactly_once(log: &ProbeLog, steps: &[StepName]) {
    for step in steps {
        let count = log.release_count(step);
        assert_eq!(count, 1, "resource '{step}' released {count} times, expected exactly once");
    }
}

/// Asserts that no step in `steps` was ever released.
///
/// # Panics
/// Panics if any release was recorded for one of the steps.
pub fn assert_never_released(log: &ProbeLog, steps: &[StepName]) {
    for step in steps {
        let count = log.release_count(step);
        assert_eq!(count, 0, "resource '{step}' released {count} times, expected never");
    }
}

/// Asserts that no step in `steps` was ever invoked.
///
/// # Panics
/// Panics if any invocation was recorded for one of the steps.
pub fn assert_never_invoked(log: &ProbeLog, steps: &[StepName]) {
    let invocations = log.invocations();
    for step in steps {
        assert!(
            !invocations.contains(step),
            "step '{step}' was invoked, expected never"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_release_assertion_accepts_exact_reverse() {
        let log = ProbeLog::new();
        let steps = [StepName::of("a"), StepName::of("b"), StepName::of("c")];
        log.record_release(&steps[2]);
        log.record_release(&steps[1]);
        log.record_release(&steps[0]);

        assert_released_in_reverse(&log, &steps);
        assert_released_exactly_once(&log, &steps);
    }

    #[test]
    #[should_panic(expected = "release order mismatch")]
    fn reverse_release_assertion_rejects_forward_order() {
        let log = ProbeLog::new();
        let steps = [StepName::of("a"), StepName::of("b")];
        log.record_release(&steps[0]);
        log.record_release(&steps[1]);

        assert_released_in_reverse(&log, &steps);
    }
}
