//! Loss functions for GAN training
//!
//! Binary Cross Entropy on probabilities (the discriminator ends in a Sigmoid).

use tch::{Reduction, Tensor};

/// Generator loss: BCE(D(G(z)), 1)
///
/// The generator wants the discriminator to output 1 (real) for fake samples.
///
/// # Arguments
///
/// * `fake_output` - Discriminator probabilities on generated samples
///
/// # Returns
///
/// Scalar loss tensor
pub fn generator_loss(fake_output: &Tensor) -> Tensor {
    let targets = Tensor::ones_like(fake_output);
    fake_output.binary_cross_entropy::<Tensor>(&targets, None, Reduction::Mean)
}

/// Discriminator loss and its two components
#[derive(Debug)]
pub struct DiscriminatorLoss {
    /// `real + fake`, the tensor that is backpropagated
    pub total: Tensor,
    /// BCE of real samples against ones
    pub real: Tensor,
    /// BCE of generated samples against zeros
    pub fake: Tensor,
}

/// Discriminator loss: BCE(D(x), 1) + BCE(D(G(z)), 0)
///
/// # Arguments
///
/// * `real_output` - Discriminator probabilities on real samples
/// * `fake_output` - Discriminator probabilities on generated samples
pub fn discriminator_loss(real_output: &Tensor, fake_output: &Tensor) -> DiscriminatorLoss {
    let real_targets = Tensor::ones_like(real_output);
    let real = real_output.binary_cross_entropy::<Tensor>(&real_targets, None, Reduction::Mean);

    let fake_targets = Tensor::zeros_like(fake_output);
    let fake = fake_output.binary_cross_entropy::<Tensor>(&fake_targets, None, Reduction::Mean);

    DiscriminatorLoss {
        total: &real + &fake,
        real,
        fake,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    fn probs(values: &[f32]) -> Tensor {
        Tensor::from_slice(values).view([-1, 1])
    }

    #[test]
    fn test_generator_loss() {
        let fake_output = Tensor::rand([4, 1], (Kind::Float, Device::Cpu)) * 0.98 + 0.01;
        let loss = generator_loss(&fake_output);

        assert_eq!(loss.size(), Vec::<i64>::new());
        assert!(loss.double_value(&[]) > 0.0);
    }

    #[test]
    fn test_generator_loss_value() {
        // -ln(0.5)
        let loss = generator_loss(&probs(&[0.5, 0.5]));
        assert!((loss.double_value(&[]) - std::f64::consts::LN_2).abs() < 1e-6);
    }

    #[test]
    fn test_generator_loss_positive_unless_fooled() {
        let loss = generator_loss(&probs(&[1.0, 1.0, 0.999]));
        assert!(loss.double_value(&[]) > 0.0);

        let loss = generator_loss(&probs(&[1.0, 1.0]));
        assert_eq!(loss.double_value(&[]), 0.0);
    }

    #[test]
    fn test_discriminator_loss_decomposition() {
        let real_output = Tensor::rand([6, 1], (Kind::Float, Device::Cpu)) * 0.98 + 0.01;
        let fake_output = Tensor::rand([6, 1], (Kind::Float, Device::Cpu)) * 0.98 + 0.01;
        let loss = discriminator_loss(&real_output, &fake_output);

        let total = loss.total.double_value(&[]);
        let sum = loss.real.double_value(&[]) + loss.fake.double_value(&[]);
        assert!((total - sum).abs() < 1e-6);
        assert!(total > 0.0);
    }

    #[test]
    fn test_perfect_discriminator() {
        let real_output = probs(&[0.9999, 0.9999]);
        let fake_output = probs(&[0.0001, 0.0001]);
        let loss = discriminator_loss(&real_output, &fake_output);

        assert!(loss.total.double_value(&[]) < 0.01);
    }

    #[test]
    fn test_saturated_inputs_stay_finite() {
        let loss = discriminator_loss(&probs(&[0.0]), &probs(&[1.0]));
        let total = loss.total.double_value(&[]);
        assert!(total.is_finite());
        assert!(total > 100.0);
    }
}
