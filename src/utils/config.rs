//! Configuration management
//!
//! Provides unified configuration for the whole training run. Defaults are
//! the hyper-parameters the models are tuned for.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{AdamSettings, DiscriminatorConfig, GeneratorConfig, Variant};
use crate::training::TrainingConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Data configuration
    pub data: DataConfig,
    /// Model configuration
    pub model: ModelConfig,
    /// Training configuration
    pub training: TrainingConfigFile,
    /// Evaluation sample configuration
    pub eval: EvalConfig,
}

/// Data-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the raw MNIST IDX files
    pub data_dir: String,
    /// Batch size
    pub batch_size: usize,
    /// Shuffle every epoch
    pub shuffle: bool,
    /// Drop the final incomplete batch
    pub drop_last: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            batch_size: 100,
            shuffle: true,
            drop_last: false,
        }
    }
}

/// Model-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Vanilla or label-conditional GAN
    pub variant: Variant,
    /// Latent dimension size
    pub latent_dim: i64,
    /// Side length of generated and discriminated images
    pub image_size: i64,
    /// Hidden layer width of both networks
    pub hidden_dim: i64,
    /// LeakyReLU negative slope in the discriminator
    pub negative_slope: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Vanilla,
            latent_dim: 100,
            image_size: 28,
            hidden_dim: 256,
            negative_slope: 0.2,
        }
    }
}

/// Training-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfigFile {
    /// Number of epochs
    pub epochs: usize,
    /// Generator learning rate
    pub gen_lr: f64,
    /// Discriminator learning rate
    pub disc_lr: f64,
    /// Adam beta1 for both optimizers
    pub beta1: f64,
    /// Adam beta2 for both optimizers
    pub beta2: f64,
    /// Checkpoint and sample every N batches
    pub save_step_interval: usize,
    /// Seed for libtorch and the loader shuffle
    pub seed: u64,
    /// Device: "auto", "cpu" or "cuda"
    pub device: String,
    /// Generator checkpoint directory
    pub gen_ckpt_dir: String,
    /// Discriminator checkpoint directory
    pub disc_ckpt_dir: String,
    /// Generated sample grid directory
    pub sample_dir: String,
    /// Epochs the mode collapse warning looks back over
    pub collapse_window: usize,
    /// Draw a progress bar per epoch
    pub show_progress: bool,
}

impl Default for TrainingConfigFile {
    fn default() -> Self {
        Self {
            epochs: 40,
            gen_lr: 2e-4,
            disc_lr: 2e-4,
            beta1: 0.5,
            beta2: 0.999,
            save_step_interval: 300,
            seed: 42,
            device: "auto".to_string(),
            gen_ckpt_dir: "G_ckpt".to_string(),
            disc_ckpt_dir: "D_ckpt".to_string(),
            sample_dir: "fake_images".to_string(),
            collapse_window: 10,
            show_progress: true,
        }
    }
}

/// Fixed evaluation batch rendered at every checkpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Labels used by the conditional variant (one sample per entry)
    pub labels: Vec<i64>,
    /// Number of samples rendered by the vanilla variant
    pub num_samples: i64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            labels: (0..10).flat_map(|d| [d, d]).collect(),
            num_samples: 50,
        }
    }
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_toml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_toml(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn save_json(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from `path` if it exists (format picked by extension), else defaults
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            tracing::info!("Config file {} not found, using defaults", path);
            return Ok(Self::default());
        }
        if path.ends_with(".json") {
            Self::from_json(path)
        } else {
            Self::from_toml(path)
        }
    }

    /// Save to `path`, format picked by extension
    pub fn save(&self, path: &str) -> Result<()> {
        if path.ends_with(".json") {
            self.save_json(path)
        } else {
            self.save_toml(path)
        }
    }

    /// Get device from configuration
    pub fn get_device(&self) -> tch::Device {
        match self.training.device.to_lowercase().as_str() {
            "cuda" | "gpu" => {
                if tch::Cuda::is_available() {
                    tch::Device::Cuda(0)
                } else {
                    tracing::warn!("CUDA requested but not available, falling back to CPU");
                    tch::Device::Cpu
                }
            }
            "auto" => tch::Device::cuda_if_available(),
            _ => tch::Device::Cpu,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.data.batch_size == 0 {
            return Err(Error::Config("batch size must be > 0".to_string()));
        }
        if self.model.latent_dim <= 0 {
            return Err(Error::Config("latent dimension must be > 0".to_string()));
        }
        if self.model.image_size <= 0 {
            return Err(Error::Config("image size must be > 0".to_string()));
        }
        if self.model.hidden_dim <= 0 {
            return Err(Error::Config("hidden dimension must be > 0".to_string()));
        }
        if !(0.0..1.0).contains(&self.model.negative_slope) {
            return Err(Error::Config(format!(
                "LeakyReLU slope {} outside [0, 1)",
                self.model.negative_slope
            )));
        }
        if self.training.collapse_window == 0 {
            return Err(Error::Config("mode collapse window must be > 0".to_string()));
        }
        if self.training.epochs == 0 {
            return Err(Error::Config("number of epochs must be > 0".to_string()));
        }
        if self.training.save_step_interval == 0 {
            return Err(Error::Config("save step interval must be > 0".to_string()));
        }
        if self.training.gen_lr <= 0.0 || self.training.disc_lr <= 0.0 {
            return Err(Error::Config("learning rates must be > 0".to_string()));
        }
        for beta in [self.training.beta1, self.training.beta2] {
            if !(0.0..1.0).contains(&beta) {
                return Err(Error::Config(format!("Adam beta {} outside [0, 1)", beta)));
            }
        }
        match self.model.variant {
            Variant::Conditional => {
                if self.eval.labels.is_empty() {
                    return Err(Error::Config("evaluation labels must not be empty".to_string()));
                }
                if let Some(bad) = self.eval.labels.iter().find(|l| !(0..10).contains(*l)) {
                    return Err(Error::Config(format!("evaluation label {} is not a digit", bad)));
                }
            }
            Variant::Vanilla => {
                if self.eval.num_samples <= 0 {
                    return Err(Error::Config("evaluation sample count must be > 0".to_string()));
                }
            }
        }
        Ok(())
    }

    /// Generator architecture described by this configuration
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            latent_dim: self.model.latent_dim,
            image_size: self.model.image_size,
            hidden_dim: self.model.hidden_dim,
            variant: self.model.variant,
        }
    }

    /// Discriminator architecture described by this configuration
    pub fn discriminator_config(&self) -> DiscriminatorConfig {
        DiscriminatorConfig {
            image_size: self.model.image_size,
            hidden_dim: self.model.hidden_dim,
            negative_slope: self.model.negative_slope,
            variant: self.model.variant,
        }
    }

    /// Trainer settings described by this configuration
    pub fn training_config(&self) -> TrainingConfig {
        let t = &self.training;
        TrainingConfig {
            epochs: t.epochs,
            gen_adam: AdamSettings {
                lr: t.gen_lr,
                beta1: t.beta1,
                beta2: t.beta2,
            },
            disc_adam: AdamSettings {
                lr: t.disc_lr,
                beta1: t.beta1,
                beta2: t.beta2,
            },
            save_step_interval: t.save_step_interval,
            eval_labels: self.eval.labels.clone(),
            num_eval_samples: self.eval.num_samples,
            metrics_path: Some(format!("{}/training_metrics.csv", t.gen_ckpt_dir)),
            collapse_window: t.collapse_window,
            show_progress: t.show_progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.data.batch_size, 100);
        assert_eq!(config.model.latent_dim, 100);
        assert_eq!(config.model.image_size, 28);
        assert_eq!(config.training.save_step_interval, 300);
        assert_eq!(config.training.epochs, 40);
        assert_eq!(
            config.eval.labels,
            vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9]
        );
        assert_eq!(config.eval.num_samples, 50);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.model.variant = Variant::Conditional;
        config.training.seed = 7;
        config.save(path).unwrap();

        let loaded = Config::load_or_default(path).unwrap();
        assert_eq!(loaded.model.variant, Variant::Conditional);
        assert_eq!(loaded.training.seed, 7);
        assert_eq!(loaded.eval.labels, config.eval.labels);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[model]\nvariant = \"conditional\"\n").unwrap();
        assert_eq!(config.model.variant, Variant::Conditional);
        assert_eq!(config.model.latent_dim, 100);
        assert_eq!(config.training.gen_ckpt_dir, "G_ckpt");
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let loaded: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.data.batch_size, loaded.data.batch_size);
        assert_eq!(config.model.latent_dim, loaded.model.latent_dim);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.training.save_step_interval = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.variant = Variant::Conditional;
        config.eval.labels = vec![3, 12];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.negative_slope = 1.5;
        assert!(config.validate().is_err());
        config.model.negative_slope = -0.1;
        assert!(config.validate().is_err());
        config.model.negative_slope = 0.0;
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.training.collapse_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_configs() {
        let mut config = Config::default();
        config.model.variant = Variant::Conditional;

        let gen = config.generator_config();
        let disc = config.discriminator_config();
        assert_eq!(gen.variant, Variant::Conditional);
        assert_eq!(disc.negative_slope, 0.2);

        let training = config.training_config();
        assert_eq!(training.gen_adam.beta1, 0.5);
        assert_eq!(training.eval_labels.len(), 20);
        assert_eq!(training.metrics_path.as_deref(), Some("G_ckpt/training_metrics.csv"));
        assert_eq!(training.collapse_window, 10);
        assert!(training.show_progress);
    }

    #[test]
    fn test_training_file_settings_reach_trainer() {
        let config: Config =
            toml::from_str("[training]\ncollapse_window = 4\nshow_progress = false\n").unwrap();

        let training = config.training_config();
        assert_eq!(training.collapse_window, 4);
        assert!(!training.show_progress);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load_or_default("/nonexistent/config.toml").unwrap();
        assert_eq!(config.data.batch_size, 100);
    }
}
