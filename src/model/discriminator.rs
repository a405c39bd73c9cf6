//! Discriminator network
//!
//! The Discriminator scores images (plus their label in the conditional
//! variant) with the probability of being real.

use tch::{nn, nn::ModuleT, Tensor};

use super::condition::{apply_condition, Variant};
use crate::error::{Error, Result};

/// Discriminator network configuration
#[derive(Debug, Clone)]
pub struct DiscriminatorConfig {
    /// Side length of the square input image
    pub image_size: i64,
    /// Width of both hidden layers
    pub hidden_dim: i64,
    /// Negative slope of the LeakyReLU activations
    pub negative_slope: f64,
    /// Vanilla or conditional input
    pub variant: Variant,
}

impl Default for DiscriminatorConfig {
    fn default() -> Self {
        Self {
            image_size: 28,
            hidden_dim: 256,
            negative_slope: 0.2,
            variant: Variant::Vanilla,
        }
    }
}

/// Discriminator network
///
/// Architecture:
/// 1. Flatten image, optionally concatenate the expanded label
/// 2. Two Linear + LeakyReLU hidden layers
/// 3. Linear projection to a single unit with Sigmoid
#[derive(Debug)]
pub struct Discriminator {
    config: DiscriminatorConfig,
    net: nn::SequentialT,
}

fn leaky_relu(xs: &Tensor, slope: f64) -> Tensor {
    xs.where_self(&xs.gt(0.0), &(xs * slope))
}

impl Discriminator {
    /// Create a new Discriminator network
    pub fn new(vs: &nn::Path, config: DiscriminatorConfig) -> Self {
        let pixels = config.image_size * config.image_size;
        let input_dim = config.variant.input_width(pixels);
        let hidden = config.hidden_dim;
        let slope = config.negative_slope;

        let net = nn::seq_t()
            .add(nn::linear(vs / "fc1", input_dim, hidden, Default::default()))
            .add_fn(move |x| leaky_relu(x, slope))
            .add(nn::linear(vs / "fc2", hidden, hidden, Default::default()))
            .add_fn(move |x| leaky_relu(x, slope))
            .add(nn::linear(vs / "fc3", hidden, 1, Default::default()))
            .add_fn(|x| x.sigmoid());

        Self { config, net }
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `images` - Tensor of shape (batch_size, 1, image_size, image_size)
    /// * `condition` - Labels of shape (batch_size), conditional variant only
    /// * `train` - Whether in training mode
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, 1) with probabilities in [0, 1]
    pub fn forward_t(&self, images: &Tensor, condition: Option<&Tensor>, train: bool) -> Result<Tensor> {
        let side = self.config.image_size;
        let size = images.size();
        let batch_size = match size.as_slice() {
            [b, 1, h, w] if *b > 0 && *h == side && *w == side => *b,
            _ => return Err(Error::shape("discriminator input", &[-1, 1, side, side], &size)),
        };

        let x = images.f_view([batch_size, -1])?;
        let x = apply_condition(self.config.variant, x, condition)?;

        Ok(self.net.forward_t(&x, train))
    }

    /// Classify samples (inference mode, no gradient tracking)
    pub fn classify(&self, images: &Tensor, condition: Option<&Tensor>) -> Result<Tensor> {
        tch::no_grad(|| self.forward_t(images, condition, false))
    }

    /// Get configuration
    pub fn config(&self) -> &DiscriminatorConfig {
        &self.config
    }
}
