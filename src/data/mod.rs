//! Data module for loading and batching digit images
//!
//! This module provides:
//! - MNIST loading into an in-memory image dataset
//! - Pixel range conversions ([0, 1] <-> [-1, 1])
//! - DataLoader for shuffled batches

mod loader;
pub mod mnist;
mod preprocessing;

pub use loader::{Batch, DataLoader};
pub use mnist::{load_train, ImageDataset};
pub use preprocessing::{normalize_images, to_img};
