//! Pixel range conversions for GAN training
//!
//! The generator ends in Tanh, so training images are moved from [0, 1] to
//! [-1, 1]; generated images are moved back before they are rendered.

use tch::Tensor;

/// Normalize pixels from [0, 1] to [-1, 1] (mean 0.5, std 0.5)
///
/// Formula: x_norm = (x - 0.5) / 0.5
pub fn normalize_images(images: &Tensor) -> Tensor {
    (images - 0.5) / 0.5
}

/// Map generator output from [-1, 1] back to [0, 1], clamping anything outside
///
/// Formula: x = clamp((x_norm + 1) / 2, 0, 1)
pub fn to_img(images: &Tensor) -> Tensor {
    ((images + 1.0) / 2.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_img_fixed_points() {
        let x = Tensor::from_slice(&[-1.0f32, 0.0, 1.0]);
        let y = to_img(&x);

        assert_eq!(y.double_value(&[0]), 0.0);
        assert_eq!(y.double_value(&[1]), 0.5);
        assert_eq!(y.double_value(&[2]), 1.0);
    }

    #[test]
    fn test_to_img_clamps() {
        let x = Tensor::from_slice(&[-3.0f32, 2.5, 0.5]);
        let y = to_img(&x);

        assert_eq!(y.double_value(&[0]), 0.0);
        assert_eq!(y.double_value(&[1]), 1.0);
        assert_eq!(y.double_value(&[2]), 0.75);
    }

    #[test]
    fn test_to_img_inverts_normalize() {
        let x = Tensor::from_slice(&[0.0f32, 0.25, 1.0]);
        let back = to_img(&normalize_images(&x));

        assert!(back.allclose(&x, 1e-6, 1e-6, false));
    }

    #[test]
    fn test_normalize_range() {
        let x = Tensor::from_slice(&[0.0f32, 0.5, 1.0]);
        let y = normalize_images(&x);

        assert_eq!(y.double_value(&[0]), -1.0);
        assert_eq!(y.double_value(&[1]), 0.0);
        assert_eq!(y.double_value(&[2]), 1.0);
    }
}
