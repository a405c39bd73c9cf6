//! DataLoader for batching and iterating over training images
//!
//! Provides batching for GAN training with support for:
//! - Seeded random shuffling, reshuffled every epoch
//! - Drop last incomplete batch
//! - Moving batches to the training device

use rand::{rngs::StdRng, seq::SliceRandom};
use tch::{Device, Tensor};

use super::mnist::ImageDataset;
use crate::utils::ExecutionContext;

/// One batch of images and their labels
#[derive(Debug)]
pub struct Batch {
    /// Shape (batch_size, 1, image_size, image_size)
    pub images: Tensor,
    /// Shape (batch_size), int64 class ids
    pub labels: Tensor,
}

impl Batch {
    pub fn len(&self) -> i64 {
        self.images.size()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// DataLoader for iterating over batched images
pub struct DataLoader {
    /// Full dataset
    data: ImageDataset,
    /// Batch size
    batch_size: usize,
    /// Whether to shuffle data each epoch
    shuffle: bool,
    /// Whether to drop the last incomplete batch
    drop_last: bool,
    /// Device batches are moved to
    device: Device,
    rng: StdRng,
    /// Current indices for iteration
    indices: Vec<i64>,
    /// Current position in iteration
    current_idx: usize,
}

impl DataLoader {
    /// Create a new DataLoader
    ///
    /// # Arguments
    ///
    /// * `data` - Dataset to iterate over
    /// * `batch_size` - Number of images per batch
    /// * `shuffle` - Whether to shuffle data each epoch
    /// * `drop_last` - Whether to drop incomplete final batch
    /// * `ctx` - Provides the target device and shuffle seed
    pub fn new(
        data: ImageDataset,
        batch_size: usize,
        shuffle: bool,
        drop_last: bool,
        ctx: &ExecutionContext,
    ) -> Self {
        let indices: Vec<i64> = (0..data.len() as i64).collect();

        let mut loader = Self {
            data,
            batch_size: batch_size.max(1),
            shuffle,
            drop_last,
            device: ctx.device(),
            rng: ctx.rng(),
            indices,
            current_idx: 0,
        };

        if shuffle {
            loader.shuffle_indices();
        }

        loader
    }

    /// Get the number of batches per epoch
    pub fn num_batches(&self) -> usize {
        let num_samples = self.data.len();
        if self.drop_last {
            num_samples / self.batch_size
        } else {
            num_samples.div_ceil(self.batch_size)
        }
    }

    /// Get total number of samples
    pub fn num_samples(&self) -> usize {
        self.data.len()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Side length of the images served
    pub fn image_size(&self) -> i64 {
        self.data.image_size()
    }

    /// Shuffle indices for a new epoch
    fn shuffle_indices(&mut self) {
        self.indices.shuffle(&mut self.rng);
    }

    /// Reset for new epoch
    pub fn reset(&mut self) {
        self.current_idx = 0;
        if self.shuffle {
            self.shuffle_indices();
        }
    }

    /// Get next batch
    ///
    /// Returns None when epoch is complete
    pub fn next_batch(&mut self) -> Option<Batch> {
        let num_samples = self.indices.len();
        let start = self.current_idx;

        if start >= num_samples {
            return None;
        }

        let end = (start + self.batch_size).min(num_samples);

        // Skip incomplete batch if drop_last
        if self.drop_last && end - start < self.batch_size {
            return None;
        }

        let index = Tensor::from_slice(&self.indices[start..end]);
        let images = self.data.images().index_select(0, &index).to_device(self.device);
        let labels = self.data.labels().index_select(0, &index).to_device(self.device);

        self.current_idx = end;
        Some(Batch { images, labels })
    }

    /// Iterate over all batches of a fresh epoch
    pub fn iter(&mut self) -> DataLoaderIter<'_> {
        self.reset();
        DataLoaderIter { loader: self }
    }
}

/// Iterator adapter for DataLoader
pub struct DataLoaderIter<'a> {
    loader: &'a mut DataLoader,
}

impl Iterator for DataLoaderIter<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        self.loader.next_batch()
    }
}
