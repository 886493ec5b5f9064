//! Property-based test suite for the acquisition chain.
//!
//! Verifies the ordering and at-most-once invariants over all small chain
//! shapes: every all-success run holds exactly its step count and releases
//! in reverse, and every failing run unwinds exactly the acquired prefix
//! without ever touching a step past the failure point.

use proptest::prelude::*;
use reschain::monitor::global_leak_monitor;
use reschain::testing::fixtures::{scripted_chain, step_names, ProbeLog};
use reschain::StepName;

proptest! {
    #[test]
    fn all_success_holds_n_resources_and_releases_n_down_to_1(n in 0usize..12) {
        let log = ProbeLog::new();
        let chain = scripted_chain(n, None, "unused", &log);
        let chain_id = chain.id();

        let state = chain.run().unwrap();
        prop_assert_eq!(state.len(), n);
        prop_assert_eq!(state.names(), step_names(n));
        prop_assert_eq!(log.total_releases(), 0);
        prop_assert_eq!(global_leak_monitor().live_for_chain(chain_id), n);

        state.release().unwrap();
        let expected: Vec<StepName> = step_names(n).into_iter().rev().collect();
        prop_assert_eq!(log.released(), expected);
        for name in &step_names(n) {
            prop_assert_eq!(log.release_count(name), 1);
        }
        prop_assert_eq!(global_leak_monitor().live_for_chain(chain_id), 0);
    }

    #[test]
    fn failure_at_k_unwinds_exactly_the_acquired_prefix(
        (n, k) in (1usize..12).prop_flat_map(|n| (Just(n), 1..=n))
    ) {
        let log = ProbeLog::new();
        let names = step_names(n);
        let chain = scripted_chain(n, Some(k), "scripted failure", &log);
        let chain_id = chain.id();

        let err = chain.run().unwrap_err();

        // Steps k+1..n never ran.
        prop_assert_eq!(log.invocations(), &names[..k]);

        // Exactly k-1 releases, in order k-1, k-2, .., 1.
        let expected: Vec<StepName> = names[..k - 1].iter().rev().cloned().collect();
        prop_assert_eq!(log.released(), expected);

        // Each acquired resource released exactly once, the rest never.
        for name in &names[..k - 1] {
            prop_assert_eq!(log.release_count(name), 1);
        }
        for name in &names[k - 1..] {
            prop_assert_eq!(log.release_count(name), 0);
        }

        // The failure names step k and carries the scripted diagnostic.
        prop_assert_eq!(err.step(), &names[k - 1]);
        prop_assert_eq!(err.diagnostic(), "scripted failure");

        // The unwind left nothing registered for this run.
        prop_assert_eq!(global_leak_monitor().live_for_chain(chain_id), 0);
    }

    #[test]
    fn dropping_a_successful_state_also_releases_in_reverse(n in 0usize..8) {
        let log = ProbeLog::new();
        {
            let _state = scripted_chain(n, None, "unused", &log).run().unwrap();
        }
        let expected: Vec<StepName> = step_names(n).into_iter().rev().collect();
        prop_assert_eq!(log.released(), expected);
    }
}
