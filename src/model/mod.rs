//! Model module containing GAN architecture components
//!
//! This module provides:
//! - Generator network mapping noise (and label) to images
//! - Discriminator network scoring images as real or fake
//! - Label conditioning shared by both networks
//! - GAN wrapper combining both networks and their parameters

mod condition;
mod discriminator;
mod gan;
mod generator;

pub use condition::{apply_condition, expand_condition, Variant};
pub use discriminator::{Discriminator, DiscriminatorConfig};
pub use gan::{AdamSettings, Gan};
pub use generator::{Generator, GeneratorConfig};
