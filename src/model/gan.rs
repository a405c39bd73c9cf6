//! GAN wrapper combining Generator and Discriminator
//!
//! Owns one variable store per network so that each optimizer only ever
//! touches its own network's parameters.

use tch::{nn, nn::OptimizerConfig, nn::VarStore, Device, Tensor};

use super::condition::Variant;
use super::discriminator::{Discriminator, DiscriminatorConfig};
use super::generator::{Generator, GeneratorConfig};
use crate::error::{Error, Result};
use crate::utils::ExecutionContext;

/// Adam hyper-parameters for one network
#[derive(Debug, Clone, Copy)]
pub struct AdamSettings {
    pub lr: f64,
    pub beta1: f64,
    pub beta2: f64,
}

impl Default for AdamSettings {
    fn default() -> Self {
        Self {
            lr: 2e-4,
            beta1: 0.5,
            beta2: 0.999,
        }
    }
}

/// Complete GAN model
pub struct Gan {
    /// Generator network
    pub generator: Generator,
    /// Discriminator network
    pub discriminator: Discriminator,
    /// Variable store for generator
    pub gen_vs: VarStore,
    /// Variable store for discriminator
    pub disc_vs: VarStore,
    variant: Variant,
    device: Device,
    training: bool,
}

impl Gan {
    /// Create a new GAN model
    ///
    /// Both configs must agree on the variant and image size.
    pub fn new(
        gen_config: GeneratorConfig,
        disc_config: DiscriminatorConfig,
        ctx: &ExecutionContext,
    ) -> Result<Self> {
        if gen_config.variant != disc_config.variant {
            return Err(Error::Config(format!(
                "generator is {} but discriminator is {}",
                gen_config.variant, disc_config.variant
            )));
        }
        if gen_config.image_size != disc_config.image_size {
            return Err(Error::Config(format!(
                "generator image size {} differs from discriminator image size {}",
                gen_config.image_size, disc_config.image_size
            )));
        }

        let device = ctx.device();
        let gen_vs = VarStore::new(device);
        let disc_vs = VarStore::new(device);
        let variant = gen_config.variant;

        let generator = Generator::new(&gen_vs.root(), gen_config);
        let discriminator = Discriminator::new(&disc_vs.root(), disc_config);

        Ok(Self {
            generator,
            discriminator,
            gen_vs,
            disc_vs,
            variant,
            device,
            training: true,
        })
    }

    /// Create a GAN with the standard hidden width (256) and LeakyReLU slope (0.2)
    pub fn with_defaults(
        variant: Variant,
        image_size: i64,
        latent_dim: i64,
        ctx: &ExecutionContext,
    ) -> Result<Self> {
        let gen_config = GeneratorConfig {
            latent_dim,
            image_size,
            variant,
            ..Default::default()
        };
        let disc_config = DiscriminatorConfig {
            image_size,
            variant,
            ..Default::default()
        };

        Self::new(gen_config, disc_config, ctx)
    }

    /// Generator optimizer
    pub fn gen_optimizer(&self, settings: AdamSettings) -> Result<nn::Optimizer> {
        Ok(adam(settings).build(&self.gen_vs, settings.lr)?)
    }

    /// Discriminator optimizer
    pub fn disc_optimizer(&self, settings: AdamSettings) -> Result<nn::Optimizer> {
        Ok(adam(settings).build(&self.disc_vs, settings.lr)?)
    }

    /// Generate images from specific noise vectors, without gradient tracking
    pub fn generate_from_noise(&self, noise: &Tensor, condition: Option<&Tensor>) -> Result<Tensor> {
        self.generator.generate(noise, condition)
    }

    /// Generator parameters by name, sorted for stable output
    pub fn generator_params(&self) -> Vec<(String, Tensor)> {
        named_params(&self.gen_vs)
    }

    /// Discriminator parameters by name, sorted for stable output
    pub fn discriminator_params(&self) -> Vec<(String, Tensor)> {
        named_params(&self.disc_vs)
    }

    /// Load generator weights from a checkpoint file
    pub fn load_generator(&mut self, path: &str) -> Result<()> {
        self.gen_vs.load(path)?;
        Ok(())
    }

    /// Load discriminator weights from a checkpoint file
    pub fn load_discriminator(&mut self, path: &str) -> Result<()> {
        self.disc_vs.load(path)?;
        Ok(())
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Get latent dimension
    pub fn latent_dim(&self) -> i64 {
        self.generator.config().latent_dim
    }

    /// Get image side length
    pub fn image_size(&self) -> i64 {
        self.generator.config().image_size
    }

    /// Set both networks to training mode
    pub fn train(&mut self) {
        self.training = true;
    }

    /// Set both networks to evaluation mode
    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Mode flag passed to the networks' forward passes
    pub fn is_training(&self) -> bool {
        self.training
    }
}

fn adam(settings: AdamSettings) -> nn::Adam {
    nn::Adam {
        beta1: settings.beta1,
        beta2: settings.beta2,
        wd: 0.0,
        ..Default::default()
    }
}

fn named_params(vs: &VarStore) -> Vec<(String, Tensor)> {
    let mut params: Vec<(String, Tensor)> = vs.variables().into_iter().collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}
