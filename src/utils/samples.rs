//! Sample sinks
//!
//! Compose a batch of generated digits into one grid image and write it out.

use std::path::{Path, PathBuf};
use tch::{Kind, Tensor};

use crate::error::{Error, Result};
use crate::training::CheckpointKey;

/// Destination for evaluation sample batches
pub trait SampleSink {
    /// Persist `images` (`[N, C, H, W]`, values in [0, 1]) under `key`
    fn save(&mut self, images: &Tensor, key: &CheckpointKey) -> Result<()>;
}

/// Arrange `[N, C, H, W]` images into a `[3, H', W']` grid, `nrow` images per row
///
/// Single-channel input is replicated to three channels. Cells are separated
/// by `padding` pixels of zeros.
pub fn make_grid(images: &Tensor, nrow: i64, padding: i64) -> Result<Tensor> {
    let size = images.size();
    let (n, c, h, w) = match size.as_slice() {
        [n, c, h, w] if *n > 0 && (*c == 1 || *c == 3) => (*n, *c, *h, *w),
        _ => return Err(Error::shape("sample batch", &[-1, 1, -1, -1], &size)),
    };
    let images = if c == 1 {
        Tensor::f_cat(&[images, images, images], 1)?
    } else {
        images.shallow_clone()
    };

    let xmaps = nrow.max(1).min(n);
    let ymaps = (n + xmaps - 1) / xmaps;
    let cell_h = h + padding;
    let cell_w = w + padding;

    let grid = Tensor::zeros(
        [3, cell_h * ymaps + padding, cell_w * xmaps + padding],
        (images.kind(), images.device()),
    );
    for k in 0..n {
        let (y, x) = (k / xmaps, k % xmaps);
        let mut cell = grid
            .narrow(1, y * cell_h + padding, h)
            .narrow(2, x * cell_w + padding, w);
        cell.copy_(&images.get(k));
    }
    Ok(grid)
}

/// Convert a [0, 1] float image to u8 pixels, rounding to nearest
pub fn to_pixels(image: &Tensor) -> Tensor {
    (image * 255.0 + 0.5).clamp(0.0, 255.0).to_kind(Kind::Uint8)
}

/// Writes `gen_imgs_<key>.jpg` grids into a directory
#[derive(Debug, Clone)]
pub struct DirSampleSink {
    dir: PathBuf,
    nrow: i64,
    padding: i64,
}

impl DirSampleSink {
    /// Create the sink and its output directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            nrow: 8,
            padding: 2,
        })
    }

    /// Override the number of images per grid row
    pub fn with_nrow(mut self, nrow: i64) -> Self {
        self.nrow = nrow;
        self
    }

    /// Full path of the grid image for `key`
    pub fn path_for(&self, key: &CheckpointKey) -> PathBuf {
        self.dir.join(format!("gen_imgs_{}.jpg", key))
    }
}

impl SampleSink for DirSampleSink {
    fn save(&mut self, images: &Tensor, key: &CheckpointKey) -> Result<()> {
        let grid = make_grid(&images.to_device(tch::Device::Cpu), self.nrow, self.padding)?;
        let path = self.path_for(key);
        tch::vision::image::save(&to_pixels(&grid), &path)?;
        tracing::debug!("Saved sample grid to {}", path.display());
        Ok(())
    }
}
