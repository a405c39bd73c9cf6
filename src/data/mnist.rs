//! MNIST digits as an in-memory image dataset
//!
//! Reads the raw IDX files (`train-images-idx3-ubyte`, `train-labels-idx1-ubyte`, ...)
//! with libtorch's loader and lays them out for the GAN.

use std::path::Path;

use tch::{Kind, Tensor};
use tracing::info;

use super::preprocessing::normalize_images;
use crate::error::{Error, Result};

/// Side length of an MNIST digit
pub const MNIST_IMAGE_SIZE: i64 = 28;

/// Number of digit classes
pub const MNIST_NUM_CLASSES: i64 = 10;

/// Images and integer labels held on the host
#[derive(Debug)]
pub struct ImageDataset {
    /// Shape (num_samples, 1, image_size, image_size), values in [-1, 1]
    images: Tensor,
    /// Shape (num_samples), int64 class ids
    labels: Tensor,
}

impl ImageDataset {
    /// Build a dataset from already normalized images and their labels
    pub fn new(images: Tensor, labels: Tensor) -> Result<Self> {
        let size = images.size();
        let n = match size.as_slice() {
            [n, 1, h, w] if h == w => *n,
            _ => return Err(Error::shape("dataset images", &[-1, 1, -1, -1], &size)),
        };
        let label_size = labels.size();
        if label_size.as_slice() != [n] {
            return Err(Error::shape("dataset labels", &[n], &label_size));
        }

        Ok(Self {
            images,
            labels: labels.to_kind(Kind::Int64),
        })
    }

    /// Get total number of samples
    pub fn len(&self) -> usize {
        self.images.size()[0] as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Side length of every image
    pub fn image_size(&self) -> i64 {
        self.images.size()[2]
    }

    pub fn images(&self) -> &Tensor {
        &self.images
    }

    pub fn labels(&self) -> &Tensor {
        &self.labels
    }
}

/// Load the MNIST training split from `dir`, normalized to [-1, 1]
///
/// `dir` must hold all four uncompressed IDX files. The `t10k-*` test files
/// are read as well even though only the training split is returned, so a
/// directory with just `train-images-idx3-ubyte` and `train-labels-idx1-ubyte`
/// fails to load.
pub fn load_train<P: AsRef<Path>>(dir: P) -> Result<ImageDataset> {
    let dir = dir.as_ref();
    info!("Loading MNIST from {}", dir.display());

    let mnist = tch::vision::mnist::load_dir(dir)?;
    let images = normalize_images(&mnist.train_images)
        .view([-1, 1, MNIST_IMAGE_SIZE, MNIST_IMAGE_SIZE]);

    let dataset = ImageDataset::new(images, mnist.train_labels)?;
    info!("Loaded {} training digits", dataset.len());
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    #[test]
    fn test_dataset_shapes() {
        let images = Tensor::zeros([5, 1, 4, 4], (Kind::Float, Device::Cpu));
        let labels = Tensor::from_slice(&[0i64, 1, 2, 3, 4]);
        let dataset = ImageDataset::new(images, labels).unwrap();

        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.image_size(), 4);
    }

    #[test]
    fn test_dataset_label_count_mismatch() {
        let images = Tensor::zeros([5, 1, 4, 4], (Kind::Float, Device::Cpu));
        let labels = Tensor::from_slice(&[0i64, 1]);
        assert!(ImageDataset::new(images, labels).is_err());
    }

    #[test]
    fn test_dataset_rejects_multichannel() {
        let images = Tensor::zeros([2, 3, 4, 4], (Kind::Float, Device::Cpu));
        let labels = Tensor::from_slice(&[0i64, 1]);
        assert!(ImageDataset::new(images, labels).is_err());
    }

    #[test]
    fn test_missing_directory_is_error() {
        assert!(load_train("/nonexistent/mnist/dir").is_err());
    }
}
