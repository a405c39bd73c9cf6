//! Training metrics for monitoring GAN progress
//!
//! Provides structures for tracking and reporting training progress.

use crate::error::Result;

/// Losses produced by one adversarial step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepLosses {
    /// Generator loss
    pub gen: f64,
    /// Discriminator loss (real + fake)
    pub disc: f64,
    /// Discriminator loss on real samples
    pub disc_real: f64,
    /// Discriminator loss on generated samples
    pub disc_fake: f64,
}

impl StepLosses {
    /// Whether every loss is a finite number
    pub fn is_finite(&self) -> bool {
        [self.gen, self.disc, self.disc_real, self.disc_fake]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Console line printed after every epoch
pub fn epoch_report(epoch: usize, losses: &StepLosses) -> String {
    format!(
        "EPOCH {} LOSS value G : {:.4} / D(r, f) : {:.4} ({:.4} , {:.4})",
        epoch, losses.gen, losses.disc, losses.disc_real, losses.disc_fake
    )
}

/// Metrics collected during training, one entry per epoch
///
/// Each entry holds the losses of the last batch of that epoch.
#[derive(Debug, Clone, Default)]
pub struct TrainingMetrics {
    /// Generator losses per epoch
    pub gen_losses: Vec<f64>,
    /// Discriminator losses per epoch
    pub disc_losses: Vec<f64>,
    /// Discriminator real-sample losses per epoch
    pub disc_real_losses: Vec<f64>,
    /// Discriminator fake-sample losses per epoch
    pub disc_fake_losses: Vec<f64>,
}

impl TrainingMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record epoch metrics
    pub fn record_epoch(&mut self, losses: &StepLosses) {
        self.gen_losses.push(losses.gen);
        self.disc_losses.push(losses.disc);
        self.disc_real_losses.push(losses.disc_real);
        self.disc_fake_losses.push(losses.disc_fake);
    }

    /// Get number of recorded epochs
    pub fn num_epochs(&self) -> usize {
        self.gen_losses.len()
    }

    /// Losses of the most recent epoch
    pub fn latest(&self) -> Option<StepLosses> {
        let i = self.num_epochs().checked_sub(1)?;
        Some(StepLosses {
            gen: self.gen_losses[i],
            disc: self.disc_losses[i],
            disc_real: self.disc_real_losses[i],
            disc_fake: self.disc_fake_losses[i],
        })
    }

    /// Get latest generator loss
    pub fn latest_gen_loss(&self) -> Option<f64> {
        self.gen_losses.last().copied()
    }

    /// Get latest discriminator loss
    pub fn latest_disc_loss(&self) -> Option<f64> {
        self.disc_losses.last().copied()
    }

    /// Calculate moving average of generator loss
    pub fn gen_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.gen_losses, window)
    }

    /// Calculate moving average of discriminator loss
    pub fn disc_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.disc_losses, window)
    }

    /// Check if the discriminator has overpowered the generator
    ///
    /// Indicators:
    /// - Discriminator loss very low (can easily distinguish)
    /// - Generator loss very high (can't fool discriminator)
    pub fn check_mode_collapse(&self, window: usize) -> bool {
        if window == 0 || self.num_epochs() < window {
            return false;
        }

        let disc_ma = self.disc_loss_ma(window);
        let gen_ma = self.gen_loss_ma(window);

        disc_ma < 0.1 && gen_ma > 5.0
    }

    /// Save metrics to CSV file
    pub fn save_csv(&self, path: &str) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(["epoch", "gen_loss", "disc_loss", "disc_real_loss", "disc_fake_loss"])?;

        for i in 0..self.num_epochs() {
            writer.write_record([
                (i + 1).to_string(),
                self.gen_losses[i].to_string(),
                self.disc_losses[i].to_string(),
                self.disc_real_losses[i].to_string(),
                self.disc_fake_losses[i].to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load metrics from CSV file
    pub fn load_csv(path: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut metrics = Self::new();

        for result in reader.records() {
            let record = result?;
            let parsed: Vec<f64> = (1..5)
                .map(|i| record.get(i).and_then(|v| v.parse().ok()))
                .collect::<Option<_>>()
                .ok_or_else(|| {
                    crate::error::Error::Config(format!("malformed metrics row: {:?}", record))
                })?;
            metrics.record_epoch(&StepLosses {
                gen: parsed[0],
                disc: parsed[1],
                disc_real: parsed[2],
                disc_fake: parsed[3],
            });
        }

        Ok(metrics)
    }
}

/// Calculate moving average of last `window` values
fn moving_average(values: &[f64], window: usize) -> f64 {
    if values.is_empty() || window == 0 {
        return 0.0;
    }

    let n = window.min(values.len());
    let sum: f64 = values.iter().rev().take(n).sum();
    sum / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn losses(gen: f64, real: f64, fake: f64) -> StepLosses {
        StepLosses {
            gen,
            disc: real + fake,
            disc_real: real,
            disc_fake: fake,
        }
    }

    #[test]
    fn test_training_metrics() {
        let mut metrics = TrainingMetrics::new();

        metrics.record_epoch(&losses(1.5, 0.4, 0.4));
        metrics.record_epoch(&losses(1.3, 0.35, 0.4));

        assert_eq!(metrics.num_epochs(), 2);
        assert_eq!(metrics.latest_gen_loss(), Some(1.3));
        assert_eq!(metrics.latest().unwrap().disc_real, 0.35);
    }

    #[test]
    fn test_epoch_report_format() {
        let line = epoch_report(3, &losses(0.69314, 0.5, 0.25));
        assert_eq!(line, "EPOCH 3 LOSS value G : 0.6931 / D(r, f) : 0.7500 (0.5000 , 0.2500)");
    }

    #[test]
    fn test_mode_collapse_heuristic() {
        let mut metrics = TrainingMetrics::new();
        for _ in 0..3 {
            metrics.record_epoch(&losses(8.0, 0.01, 0.01));
        }
        assert!(metrics.check_mode_collapse(3));
        assert!(!metrics.check_mode_collapse(5));
    }

    #[test]
    fn test_csv_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        let path = path.to_str().unwrap();

        let mut metrics = TrainingMetrics::new();
        metrics.record_epoch(&losses(1.0, 0.5, 0.25));
        metrics.record_epoch(&losses(2.0, 0.125, 0.5));
        metrics.save_csv(path).unwrap();

        let loaded = TrainingMetrics::load_csv(path).unwrap();
        assert_eq!(loaded.num_epochs(), 2);
        assert_eq!(loaded.latest(), metrics.latest());
    }
}
