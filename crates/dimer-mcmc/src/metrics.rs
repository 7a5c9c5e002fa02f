use serde::{Deserialize, Serialize};

/// Counters of single-face updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlipStats {
    /// Updates attempted, including those on frozen faces.
    pub attempts: u64,
    /// Updates that found the face up.
    pub up_attempts: u64,
    /// Updates that found the face down.
    pub down_attempts: u64,
    /// Up faces turned down.
    pub flips_down: u64,
    /// Down faces turned up.
    pub flips_up: u64,
}

impl FlipStats {
    /// Updates that found a flippable face.
    pub fn flippable(&self) -> u64 {
        self.up_attempts + self.down_attempts
    }

    /// Updates that changed the configuration.
    pub fn accepted(&self) -> u64 {
        self.flips_down + self.flips_up
    }

    /// Accepted over flippable updates.
    pub fn acceptance_rate(&self) -> f64 {
        ratio(self.accepted(), self.flippable())
    }

    /// Empirical probability that an up face is turned down.
    pub fn down_rate(&self) -> f64 {
        ratio(self.flips_down, self.up_attempts)
    }

    /// Empirical probability that a down face is turned up.
    pub fn up_rate(&self) -> f64 {
        ratio(self.flips_up, self.down_attempts)
    }

    /// Adds another set of counters.
    pub fn merge(&mut self, other: &FlipStats) {
        self.attempts += other.attempts;
        self.up_attempts += other.up_attempts;
        self.down_attempts += other.down_attempts;
        self.flips_down += other.flips_down;
        self.flips_up += other.flips_up;
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Snapshot of a session's counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Single-face updates performed by the preview chain.
    pub flip_attempts: u64,
    /// Preview updates that changed the configuration.
    pub flips_accepted: u64,
    /// Accepted over flippable preview updates.
    pub acceptance_rate: f64,
    /// Epochs run by the current coupling.
    pub epochs: usize,
    /// Current coupling window in steps.
    pub window: u64,
    /// Cells on which the coupled chains disagree.
    pub gap: usize,
    /// Exact samples produced so far.
    pub exact_samples: u64,
    /// Current winding number of every hole.
    pub windings: Vec<i32>,
}
