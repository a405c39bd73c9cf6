//! # GANs for Handwritten Digits
//!
//! This crate trains two small Generative Adversarial Networks on MNIST:
//! a vanilla GAN driven by latent noise only, and a conditional GAN that
//! also receives the digit label.
//!
//! ## Modules
//!
//! - `data`: MNIST loading, pixel normalization and batching
//! - `model`: Generator, Discriminator and label conditioning
//! - `training`: Training loop, loss functions and metrics
//! - `utils`: Configuration, execution context and checkpoint/sample sinks

pub mod data;
pub mod error;
pub mod model;
pub mod training;
pub mod utils;

pub use data::{load_train, to_img, DataLoader, ImageDataset};
pub use error::{Error, Result};
pub use model::{Discriminator, Gan, Generator, Variant};
pub use training::{Trainer, TrainingConfig, TrainingMetrics};
pub use utils::{Config, DirCheckpointSink, DirSampleSink, ExecutionContext};
