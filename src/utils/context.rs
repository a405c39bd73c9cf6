//! Execution context shared by every component of a run
//!
//! Holds the device tensors are placed on and the seed that drives both
//! libtorch's generator (latent noise, weight init) and the loader shuffle.

use rand::{rngs::StdRng, SeedableRng};
use tch::{Device, Kind, Tensor};

/// Device handle and random state for a training run
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext {
    device: Device,
    seed: u64,
}

impl ExecutionContext {
    /// Create a context and seed libtorch's global generator
    pub fn new(device: Device, seed: u64) -> Self {
        tch::manual_seed(seed as i64);
        Self { device, seed }
    }

    /// CPU context, used by tests and small experiments
    pub fn cpu(seed: u64) -> Self {
        Self::new(Device::Cpu, seed)
    }

    /// Device tensors are created on
    pub fn device(&self) -> Device {
        self.device
    }

    /// Seed the run was started with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Host-side RNG derived from the run seed
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// Sample a `[batch_size, latent_dim]` standard normal latent batch
    pub fn sample_latent(&self, batch_size: i64, latent_dim: i64) -> Tensor {
        Tensor::randn([batch_size, latent_dim], (Kind::Float, self.device))
    }
}
