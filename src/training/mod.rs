//! Training module for the GAN
//!
//! This module provides:
//! - Training loop implementation
//! - Loss functions (Binary Cross Entropy)
//! - Checkpoint cadence and keys
//! - Training metrics and epoch reports

mod losses;
mod metrics;
mod schedule;
mod trainer;

pub use losses::{discriminator_loss, generator_loss, DiscriminatorLoss};
pub use metrics::{epoch_report, StepLosses, TrainingMetrics};
pub use schedule::{CheckpointKey, CheckpointSchedule};
pub use trainer::{EvalBatch, Optimizers, Trainer, TrainingConfig};
