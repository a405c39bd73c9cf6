//! Generator network
//!
//! The Generator maps latent noise vectors (plus the digit label in the
//! conditional variant) to single-channel images in the [-1, 1] range.
//! Architecture is a three-layer perceptron with a Tanh output.

use tch::{nn, nn::ModuleT, Tensor};

use super::condition::{apply_condition, Variant};
use crate::error::{Error, Result};

/// Generator network configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Size of the latent noise vector
    pub latent_dim: i64,
    /// Side length of the square output image
    pub image_size: i64,
    /// Width of both hidden layers
    pub hidden_dim: i64,
    /// Vanilla or conditional input
    pub variant: Variant,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            latent_dim: 100,
            image_size: 28,
            hidden_dim: 256,
            variant: Variant::Vanilla,
        }
    }
}

/// Generator network
///
/// Architecture:
/// 1. Optional label concatenation (input width doubles)
/// 2. Two Linear + ReLU hidden layers
/// 3. Linear projection to `image_size * image_size` with Tanh
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    net: nn::SequentialT,
}

impl Generator {
    /// Create a new Generator network
    pub fn new(vs: &nn::Path, config: GeneratorConfig) -> Self {
        let input_dim = config.variant.input_width(config.latent_dim);
        let hidden = config.hidden_dim;
        let output_dim = config.image_size * config.image_size;

        let net = nn::seq_t()
            .add(nn::linear(vs / "fc1", input_dim, hidden, Default::default()))
            .add_fn(|x| x.relu())
            .add(nn::linear(vs / "fc2", hidden, hidden, Default::default()))
            .add_fn(|x| x.relu())
            .add(nn::linear(vs / "fc3", hidden, output_dim, Default::default()))
            .add_fn(|x| x.tanh());

        Self { config, net }
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `noise` - Tensor of shape (batch_size, latent_dim)
    /// * `condition` - Labels of shape (batch_size), conditional variant only
    /// * `train` - Whether in training mode
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, 1, image_size, image_size)
    pub fn forward_t(&self, noise: &Tensor, condition: Option<&Tensor>, train: bool) -> Result<Tensor> {
        let size = noise.size();
        let batch_size = match size.as_slice() {
            [b, d] if *b > 0 && *d == self.config.latent_dim => *b,
            _ => {
                return Err(Error::shape(
                    "generator noise",
                    &[-1, self.config.latent_dim],
                    &size,
                ))
            }
        };

        let x = apply_condition(self.config.variant, noise.shallow_clone(), condition)?;
        let out = self.net.forward_t(&x, train);

        let side = self.config.image_size;
        Ok(out.f_view([batch_size, 1, side, side])?)
    }

    /// Generate samples (inference mode, no gradient tracking)
    pub fn generate(&self, noise: &Tensor, condition: Option<&Tensor>) -> Result<Tensor> {
        tch::no_grad(|| self.forward_t(noise, condition, false))
    }

    /// Get configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{nn::VarStore, Device, Kind};

    fn small_config(variant: Variant) -> GeneratorConfig {
        GeneratorConfig {
            latent_dim: 8,
            image_size: 6,
            hidden_dim: 16,
            variant,
        }
    }

    #[test]
    fn test_generator_output_shape() {
        let vs = VarStore::new(Device::Cpu);
        let gen = Generator::new(&vs.root(), small_config(Variant::Vanilla));

        for batch in [1, 3, 10] {
            let noise = Tensor::randn([batch, 8], (Kind::Float, Device::Cpu));
            let output = gen.forward_t(&noise, None, true).unwrap();
            assert_eq!(output.size(), vec![batch, 1, 6, 6]);
        }
    }

    #[test]
    fn test_generator_output_range() {
        let vs = VarStore::new(Device::Cpu);
        let gen = Generator::new(&vs.root(), small_config(Variant::Vanilla));

        let noise = Tensor::randn([16, 8], (Kind::Float, Device::Cpu)) * 50.0;
        let output = gen.generate(&noise, None).unwrap();

        assert!(output.min().double_value(&[]) >= -1.0);
        assert!(output.max().double_value(&[]) <= 1.0);
    }

    #[test]
    fn test_conditional_generator() {
        let vs = VarStore::new(Device::Cpu);
        let gen = Generator::new(&vs.root(), small_config(Variant::Conditional));

        let noise = Tensor::randn([4, 8], (Kind::Float, Device::Cpu));
        let labels = Tensor::from_slice(&[0i64, 1, 2, 3]);
        let output = gen.forward_t(&noise, Some(&labels), true).unwrap();
        assert_eq!(output.size(), vec![4, 1, 6, 6]);

        let bad_labels = Tensor::from_slice(&[0i64, 1, 2]);
        let err = gen.forward_t(&noise, Some(&bad_labels), true).unwrap_err();
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_generator_rejects_wrong_latent() {
        let vs = VarStore::new(Device::Cpu);
        let gen = Generator::new(&vs.root(), small_config(Variant::Vanilla));

        let noise = Tensor::randn([4, 9], (Kind::Float, Device::Cpu));
        assert!(gen.forward_t(&noise, None, true).is_err());
    }

    #[test]
    fn test_generator_parameter_names() {
        let vs = VarStore::new(Device::Cpu);
        let _gen = Generator::new(&vs.root(), small_config(Variant::Conditional));

        let vars = vs.variables();
        assert_eq!(vars.len(), 6);
        assert_eq!(vars["fc1.weight"].size(), vec![16, 16]);
        assert_eq!(vars["fc3.weight"].size(), vec![36, 16]);
    }
}
