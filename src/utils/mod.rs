//! Utility module with the collaborators the trainer calls into
//!
//! This module provides:
//! - Configuration handling
//! - Execution context (device and seed)
//! - Checkpoint and sample sinks

mod checkpoint;
mod config;
mod context;
mod samples;

pub use checkpoint::{
    load_checkpoint_meta, CheckpointMeta, CheckpointSink, DirCheckpointSink, ModelRole,
};
pub use config::{Config, DataConfig, EvalConfig, ModelConfig, TrainingConfigFile};
pub use context::ExecutionContext;
pub use samples::{make_grid, to_pixels, DirSampleSink, SampleSink};
