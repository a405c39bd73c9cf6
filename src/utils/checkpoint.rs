//! Checkpoint sinks
//!
//! Persist each network's named parameters at checkpoint batches, along with
//! a small metadata file describing the most recent checkpoint.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tch::Tensor;

use crate::error::Result;
use crate::model::Variant;
use crate::training::{CheckpointKey, StepLosses};

/// Which network a set of parameters belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    Generator,
    Discriminator,
}

impl ModelRole {
    /// File name prefix, `G` or `D`
    pub fn prefix(self) -> &'static str {
        match self {
            ModelRole::Generator => "G",
            ModelRole::Discriminator => "D",
        }
    }
}

/// Destination for parameter snapshots
pub trait CheckpointSink {
    /// Persist `params` of the `role` network under `key`
    fn save(&mut self, role: ModelRole, params: &[(String, Tensor)], key: &CheckpointKey) -> Result<()>;

    /// Called once both networks of a checkpoint have been saved
    fn finish(&mut self, _key: &CheckpointKey, _variant: Variant, _losses: &StepLosses) -> Result<()> {
        Ok(())
    }
}

/// Checkpoint metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    /// Key the files were written under
    pub key: String,
    /// 1-based epoch
    pub epoch: usize,
    /// Batch index within the epoch
    pub batch: usize,
    /// Vanilla or conditional
    pub variant: Variant,
    /// Losses of the step the checkpoint was taken after
    pub gen_loss: f64,
    pub disc_loss: f64,
    /// Timestamp of checkpoint
    pub timestamp: String,
}

/// Name of the metadata file kept next to the generator checkpoints
pub const META_FILE: &str = "checkpoint_meta.json";

/// Writes `G_model_<key>.ckpt` and `D_model_<key>.ckpt` into two directories
#[derive(Debug, Clone)]
pub struct DirCheckpointSink {
    gen_dir: PathBuf,
    disc_dir: PathBuf,
}

impl DirCheckpointSink {
    /// Create the sink and both output directories
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(gen_dir: P, disc_dir: Q) -> Result<Self> {
        let gen_dir = gen_dir.as_ref().to_path_buf();
        let disc_dir = disc_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&gen_dir)?;
        std::fs::create_dir_all(&disc_dir)?;
        Ok(Self { gen_dir, disc_dir })
    }

    /// Full path of the checkpoint file for `role` at `key`
    pub fn path_for(&self, role: ModelRole, key: &CheckpointKey) -> PathBuf {
        let dir = match role {
            ModelRole::Generator => &self.gen_dir,
            ModelRole::Discriminator => &self.disc_dir,
        };
        dir.join(format!("{}_model_{}.ckpt", role.prefix(), key))
    }
}

impl CheckpointSink for DirCheckpointSink {
    fn save(&mut self, role: ModelRole, params: &[(String, Tensor)], key: &CheckpointKey) -> Result<()> {
        let path = self.path_for(role, key);
        Tensor::save_multi(params, &path)?;
        tracing::debug!("Saved {} parameters to {}", params.len(), path.display());
        Ok(())
    }

    fn finish(&mut self, key: &CheckpointKey, variant: Variant, losses: &StepLosses) -> Result<()> {
        let meta = CheckpointMeta {
            key: key.to_string(),
            epoch: key.epoch,
            batch: key.batch,
            variant,
            gen_loss: losses.gen,
            disc_loss: losses.disc,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)?;
        std::fs::write(self.gen_dir.join(META_FILE), meta_json)?;

        tracing::info!("Saved checkpoint {}", key);
        Ok(())
    }
}

/// Load checkpoint metadata written next to the generator checkpoints
pub fn load_checkpoint_meta<P: AsRef<Path>>(gen_dir: P) -> Result<CheckpointMeta> {
    let content = std::fs::read_to_string(gen_dir.as_ref().join(META_FILE))?;
    let meta: CheckpointMeta = serde_json::from_str(&content)?;
    Ok(meta)
}
