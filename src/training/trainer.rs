//! Training loop implementation for the GAN
//!
//! Provides the main training loop with strictly alternating updates:
//! discriminator first, then generator, one batch at a time.

use indicatif::{ProgressBar, ProgressStyle};
use tch::{nn, Tensor};
use tracing::{debug, info, warn};

use super::losses::{discriminator_loss, generator_loss};
use super::metrics::{epoch_report, StepLosses, TrainingMetrics};
use super::schedule::{CheckpointKey, CheckpointSchedule};
use crate::data::{to_img, DataLoader};
use crate::error::{Error, Result};
use crate::model::{AdamSettings, Gan, Variant};
use crate::utils::{CheckpointSink, ExecutionContext, ModelRole, SampleSink};

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Number of training epochs
    pub epochs: usize,
    /// Optimizer settings for the generator
    pub gen_adam: AdamSettings,
    /// Optimizer settings for the discriminator
    pub disc_adam: AdamSettings,
    /// Checkpoint and render samples every N batches
    pub save_step_interval: usize,
    /// Labels of the evaluation batch (conditional variant)
    pub eval_labels: Vec<i64>,
    /// Size of the evaluation batch (vanilla variant)
    pub num_eval_samples: i64,
    /// Where to write per-epoch losses at the end of training
    pub metrics_path: Option<String>,
    /// Number of epochs the mode collapse heuristic looks back over
    pub collapse_window: usize,
    /// Draw a progress bar per epoch
    pub show_progress: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 40,
            gen_adam: AdamSettings::default(),
            disc_adam: AdamSettings::default(),
            save_step_interval: 300,
            eval_labels: (0..10).flat_map(|d| [d, d]).collect(),
            num_eval_samples: 50,
            metrics_path: None,
            collapse_window: 10,
            show_progress: true,
        }
    }
}

/// The two optimizers of a GAN, each bound to one network's parameters
pub struct Optimizers {
    pub gen: nn::Optimizer,
    pub disc: nn::Optimizer,
}

impl Optimizers {
    /// Build Adam optimizers for both networks of `gan`
    pub fn new(gan: &Gan, config: &TrainingConfig) -> Result<Self> {
        Ok(Self {
            gen: gan.gen_optimizer(config.gen_adam)?,
            disc: gan.disc_optimizer(config.disc_adam)?,
        })
    }
}

/// Fixed latent vectors (and labels) rendered at every checkpoint
#[derive(Debug)]
pub struct EvalBatch {
    pub noise: Tensor,
    pub labels: Option<Tensor>,
}

/// GAN Trainer
pub struct Trainer {
    config: TrainingConfig,
    ctx: ExecutionContext,
    schedule: CheckpointSchedule,
    metrics: TrainingMetrics,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(config: TrainingConfig, ctx: ExecutionContext) -> Self {
        let schedule = CheckpointSchedule::new(config.save_step_interval);
        Self {
            config,
            ctx,
            schedule,
            metrics: TrainingMetrics::new(),
        }
    }

    /// Train the GAN
    ///
    /// # Arguments
    ///
    /// * `gan` - Model to train
    /// * `data_loader` - DataLoader providing (image, label) batches
    /// * `checkpoints` - Receives both networks' parameters at checkpoint batches
    /// * `samples` - Receives the rendered evaluation batch at checkpoint batches
    ///
    /// # Returns
    ///
    /// Training metrics
    pub fn train(
        &mut self,
        gan: &mut Gan,
        data_loader: &mut DataLoader,
        checkpoints: &mut dyn CheckpointSink,
        samples: &mut dyn SampleSink,
    ) -> Result<&TrainingMetrics> {
        if self.config.save_step_interval == 0 {
            return Err(Error::Config("save step interval must be > 0".to_string()));
        }
        if data_loader.image_size() != gan.image_size() {
            return Err(Error::Config(format!(
                "dataset images are {}x{} but the model expects {}x{}",
                data_loader.image_size(),
                data_loader.image_size(),
                gan.image_size(),
                gan.image_size()
            )));
        }

        let mut optimizers = Optimizers::new(gan, &self.config)?;
        let eval = self.eval_batch(gan)?;
        let num_batches = data_loader.num_batches();

        info!(
            "Starting {} training for {} epochs, {} batches per epoch",
            gan.variant(),
            self.config.epochs,
            num_batches
        );

        for epoch in 0..self.config.epochs {
            let pb = self.progress_bar(num_batches);
            let mut last: Option<StepLosses> = None;

            for (i, batch) in data_loader.iter().enumerate() {
                gan.train();
                let losses = self.train_step(gan, &mut optimizers, &batch.images, &batch.labels)?;
                debug!(
                    "epoch {} batch {}: G={:.4} D={:.4}",
                    epoch + 1,
                    i,
                    losses.gen,
                    losses.disc
                );

                if self.schedule.is_due(i) {
                    let key = CheckpointKey::new(epoch + 1, i);
                    self.checkpoint(gan, &eval, &key, &losses, checkpoints, samples)?;
                }

                last = Some(losses);
                pb.set_message(format!("G: {:.4}, D: {:.4}", losses.gen, losses.disc));
                pb.inc(1);
            }

            pb.finish_and_clear();

            let Some(losses) = last else {
                warn!("Epoch {} produced no batches", epoch + 1);
                continue;
            };

            self.metrics.record_epoch(&losses);
            // Printed regardless of the tracing level
            println!("{}", epoch_report(epoch + 1, &losses));

            if self.metrics.check_mode_collapse(self.config.collapse_window) {
                warn!("Discriminator dominates the generator. Consider adjusting learning rates.");
            }
        }

        if let Some(path) = &self.config.metrics_path {
            if let Err(e) = self.metrics.save_csv(path) {
                warn!("Failed to save metrics: {}", e);
            }
        }

        Ok(&self.metrics)
    }

    /// One adversarial step: update the discriminator, then the generator
    ///
    /// Each half draws its own latent batch. The fakes fed to the
    /// discriminator update are detached so the generator is untouched there.
    pub fn train_step(
        &self,
        gan: &Gan,
        optimizers: &mut Optimizers,
        images: &Tensor,
        labels: &Tensor,
    ) -> Result<StepLosses> {
        let batch_size = images.size().first().copied().unwrap_or(0);
        let latent_dim = gan.latent_dim();
        let condition = match gan.variant() {
            Variant::Conditional => Some(labels),
            Variant::Vanilla => None,
        };
        let train = gan.is_training();

        // ========== Train Discriminator ==========
        let noise = self.ctx.sample_latent(batch_size, latent_dim);
        let fake_data = gan.generator.forward_t(&noise, condition, train)?.detach();

        let real_output = gan.discriminator.forward_t(images, condition, train)?;
        let fake_output = gan.discriminator.forward_t(&fake_data, condition, train)?;

        let d_loss = discriminator_loss(&real_output, &fake_output);

        optimizers.disc.zero_grad();
        d_loss.total.backward();
        optimizers.disc.step();

        // ========== Train Generator ==========
        let noise = self.ctx.sample_latent(batch_size, latent_dim);
        let fake_data = gan.generator.forward_t(&noise, condition, train)?;
        let fake_output = gan.discriminator.forward_t(&fake_data, condition, train)?;

        let g_loss = generator_loss(&fake_output);

        optimizers.gen.zero_grad();
        g_loss.backward();
        optimizers.gen.step();

        Ok(StepLosses {
            gen: g_loss.double_value(&[]),
            disc: d_loss.total.double_value(&[]),
            disc_real: d_loss.real.double_value(&[]),
            disc_fake: d_loss.fake.double_value(&[]),
        })
    }

    /// Fixed evaluation inputs, drawn once per run
    pub fn eval_batch(&self, gan: &Gan) -> Result<EvalBatch> {
        let labels = match gan.variant() {
            Variant::Conditional => {
                if self.config.eval_labels.is_empty() {
                    return Err(Error::Config("evaluation labels must not be empty".to_string()));
                }
                Some(Tensor::from_slice(&self.config.eval_labels).to_device(self.ctx.device()))
            }
            Variant::Vanilla => None,
        };
        let n = match &labels {
            Some(l) => l.size()[0],
            None => self.config.num_eval_samples,
        };
        if n <= 0 {
            return Err(Error::Config("evaluation batch must not be empty".to_string()));
        }

        Ok(EvalBatch {
            noise: self.ctx.sample_latent(n, gan.latent_dim()),
            labels,
        })
    }

    /// Persist both networks and render the evaluation batch
    fn checkpoint(
        &self,
        gan: &mut Gan,
        eval: &EvalBatch,
        key: &CheckpointKey,
        losses: &StepLosses,
        checkpoints: &mut dyn CheckpointSink,
        samples: &mut dyn SampleSink,
    ) -> Result<()> {
        gan.eval();

        checkpoints.save(ModelRole::Generator, &gan.generator_params(), key)?;
        checkpoints.save(ModelRole::Discriminator, &gan.discriminator_params(), key)?;
        checkpoints.finish(key, gan.variant(), losses)?;

        let fake_images = gan.generate_from_noise(&eval.noise, eval.labels.as_ref())?;
        samples.save(&to_img(&fake_images), key)?;

        Ok(())
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        pb.set_style(style);
        pb
    }

    /// Get training metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Get configuration
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn schedule(&self) -> CheckpointSchedule {
        self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    #[test]
    fn test_training_config_default() {
        let config = TrainingConfig::default();
        assert_eq!(config.epochs, 40);
        assert_eq!(config.save_step_interval, 300);
        assert_eq!(config.eval_labels.len(), 20);
    }

    #[test]
    fn test_eval_batch_conditional() {
        let ctx = ExecutionContext::cpu(0);
        let gan = Gan::with_defaults(Variant::Conditional, 4, 6, &ctx).unwrap();
        let trainer = Trainer::new(TrainingConfig::default(), ctx);

        let eval = trainer.eval_batch(&gan).unwrap();
        assert_eq!(eval.noise.size(), vec![20, 6]);
        let labels = eval.labels.unwrap();
        assert_eq!(labels.int64_value(&[0]), 0);
        assert_eq!(labels.int64_value(&[1]), 0);
        assert_eq!(labels.int64_value(&[19]), 9);
    }

    #[test]
    fn test_eval_batch_vanilla() {
        let ctx = ExecutionContext::cpu(0);
        let gan = Gan::with_defaults(Variant::Vanilla, 4, 6, &ctx).unwrap();
        let trainer = Trainer::new(TrainingConfig::default(), ctx);

        let eval = trainer.eval_batch(&gan).unwrap();
        assert_eq!(eval.noise.size(), vec![50, 6]);
        assert!(eval.labels.is_none());
    }

    #[test]
    fn test_train_step_losses() {
        let ctx = ExecutionContext::cpu(5);
        let gan = Gan::with_defaults(Variant::Vanilla, 4, 4, &ctx).unwrap();
        let config = TrainingConfig::default();
        let mut optimizers = Optimizers::new(&gan, &config).unwrap();
        let trainer = Trainer::new(config, ctx);

        let images = Tensor::rand([3, 1, 4, 4], (Kind::Float, Device::Cpu)) * 2.0 - 1.0;
        let labels = Tensor::zeros([3], (Kind::Int64, Device::Cpu));
        let losses = trainer.train_step(&gan, &mut optimizers, &images, &labels).unwrap();

        assert!(losses.is_finite());
        assert!(losses.gen > 0.0);
        assert!((losses.disc - (losses.disc_real + losses.disc_fake)).abs() < 1e-5);
    }

    #[test]
    fn test_train_step_rejects_mismatched_labels() {
        let ctx = ExecutionContext::cpu(5);
        let gan = Gan::with_defaults(Variant::Conditional, 4, 4, &ctx).unwrap();
        let config = TrainingConfig::default();
        let mut optimizers = Optimizers::new(&gan, &config).unwrap();
        let trainer = Trainer::new(config, ctx);

        let images = Tensor::zeros([3, 1, 4, 4], (Kind::Float, Device::Cpu));
        let labels = Tensor::zeros([2], (Kind::Int64, Device::Cpu));
        let err = trainer
            .train_step(&gan, &mut optimizers, &images, &labels)
            .unwrap_err();
        assert!(err.is_shape_error());
    }
}
