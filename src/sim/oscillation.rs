//! Detection of circuits that keep cycling through the same states

use std::collections::VecDeque;
use std::fmt;

use itertools::Itertools;

use crate::Circuit;

/// Report of a state that repeated too often in the recent ticks
///
/// This is advisory: the simulation keeps running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OscillationDetected {
    /// Snapshot of the repeated state
    pub pattern: String,
    /// Number of occurrences in the window
    pub count: usize,
}

impl fmt::Display for OscillationDetected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Oscillation detected: state seen {} times ({})",
            self.count, self.pattern
        )
    }
}

/// Snapshot of all component values, as `id:0|1` entries sorted by id
pub fn snapshot(circuit: &Circuit) -> String {
    circuit
        .components()
        .iter()
        .map(|c| format!("{}:{}", c.id(), c.output() as u8))
        .join(",")
}

/// Rolling window of snapshots
#[derive(Debug, Clone)]
pub struct OscillationDetector {
    window: VecDeque<String>,
    size: usize,
    threshold: usize,
}

impl OscillationDetector {
    /// Create a detector over `size` snapshots, reporting states seen `threshold` times
    pub fn new(size: usize, threshold: usize) -> OscillationDetector {
        OscillationDetector {
            window: VecDeque::with_capacity(size + 1),
            size,
            threshold,
        }
    }

    /// Number of snapshots in the window
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Returns whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Forget all snapshots
    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Record a snapshot, and report an oscillation once the window is full
    ///
    /// A window made of a single state is a stable circuit, not an oscillation.
    /// The window is cleared after a report.
    pub fn record(&mut self, snapshot: String) -> Option<OscillationDetected> {
        self.window.push_back(snapshot);
        while self.window.len() > self.size {
            self.window.pop_front();
        }
        if self.window.len() < self.size {
            return None;
        }
        let counts = self.window.iter().counts();
        if counts.len() < 2 {
            return None;
        }
        let ret = self
            .window
            .iter()
            .map(|s| (s, counts.get(s).copied().unwrap_or(0)))
            .find(|(_, count)| *count >= self.threshold)
            .map(|(s, count)| OscillationDetected {
                pattern: s.clone(),
                count,
            });
        if ret.is_some() {
            self.window.clear();
        }
        ret
    }
}
