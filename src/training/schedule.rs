//! Checkpoint cadence and naming

use std::fmt;

/// Decides which batches of an epoch trigger a checkpoint/sample event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointSchedule {
    interval: usize,
}

impl CheckpointSchedule {
    /// Create a schedule firing every `interval` batches, starting at batch 0
    ///
    /// An interval of zero is clamped to one. `Trainer::train` refuses a zero
    /// interval before a schedule is ever consulted.
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
        }
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Whether the batch at `batch_index` (0-based, within an epoch) is a checkpoint batch
    pub fn is_due(&self, batch_index: usize) -> bool {
        batch_index % self.interval == 0
    }

    /// All checkpoint batches for an epoch of `num_batches` batches
    pub fn due_batches(&self, num_batches: usize) -> Vec<usize> {
        (0..num_batches).step_by(self.interval).collect()
    }
}

impl Default for CheckpointSchedule {
    fn default() -> Self {
        Self::new(300)
    }
}

/// Identifies a checkpoint by 1-based epoch and 0-based batch index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointKey {
    pub epoch: usize,
    pub batch: usize,
}

impl CheckpointKey {
    pub fn new(epoch: usize, batch: usize) -> Self {
        Self { epoch, batch }
    }
}

impl fmt::Display for CheckpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}_{:03}", self.epoch, self.batch)
    }
}
