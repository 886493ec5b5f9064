//! Resource monitoring and leak detection.
//!
//! Every acquisition chain registers its resources here as it acquires and
//! releases them, which makes the "no leaked handles" contract observable:
//! after a failed run finishes unwinding, or after a successful run's state
//! is released, the monitor holds nothing for that chain.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::types::{ChainId, StepName};

/// Tracks live resource handles across all chain runs in the process.
#[derive(Debug, Default)]
pub struct LeakMonitor {
    live: Mutex<HashMap<String, LiveHandle>>,
}

#[derive(Debug, Clone)]
struct LiveHandle {
    chain: ChainId,
    step: StepName,
    acquired_at: Instant,
}

impl LeakMonitor {
    /// Creates a new, empty monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resource acquisition, returning the handle id to release
    /// it under.
    pub fn record_acquisition(&self, chain: ChainId, step: &StepName) -> String {
        let handle_id = format!("{step}_{}", Uuid::now_v7());
        if let Ok(mut live) = self.live.lock() {
            live.insert(
                handle_id.clone(),
                LiveHandle {
                    chain,
                    step: step.clone(),
                    acquired_at: Instant::now(),
                },
            );
        }
        handle_id
    }

    /// Records a resource release.
    pub fn record_release(&self, handle_id: &str) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(handle_id);
        }
    }

    /// Number of live handles registered for one chain run.
    pub fn live_for_chain(&self, chain: ChainId) -> usize {
        self.live.lock().map_or(0, |live| {
            live.values().filter(|h| h.chain == chain).count()
        })
    }

    /// Statistics about live handles.
    pub fn stats(&self) -> LeakStats {
        self.live.lock().map_or_else(
            |_| LeakStats::default(),
            |live| {
                let total_live = live.len();
                let mut by_step = HashMap::new();
                let mut oldest_age = Duration::ZERO;

                for handle in live.values() {
                    *by_step.entry(handle.step.to_string()).or_insert(0) += 1;
                    let age = handle.acquired_at.elapsed();
                    if age > oldest_age {
                        oldest_age = age;
                    }
                }

                LeakStats {
                    total_live,
                    by_step,
                    oldest_age,
                }
            },
        )
    }

    /// Finds handles that have been live longer than `threshold`.
    pub fn find_potential_leaks(&self, threshold: Duration) -> Vec<String> {
        self.live.lock().map_or_else(
            |_| Vec::new(),
            |live| {
                live.iter()
                    .filter(|(_, handle)| handle.acquired_at.elapsed() > threshold)
                    .map(|(id, _)| id.clone())
                    .collect()
            },
        )
    }
}

/// Statistics about live resource handles.
#[derive(Debug, Default)]
pub struct LeakStats {
    /// Total number of live handles.
    pub total_live: usize,
    /// Count of live handles by step name.
    pub by_step: HashMap<String, usize>,
    /// Age of the oldest live handle.
    pub oldest_age: Duration,
}

/// Global leak monitor instance.
static GLOBAL_LEAK_MONITOR: OnceLock<LeakMonitor> = OnceLock::new();

/// Returns the process-global leak monitor.
pub fn global_leak_monitor() -> &'static LeakMonitor {
    GLOBAL_LEAK_MONITOR.get_or_init(LeakMonitor::new)
}
