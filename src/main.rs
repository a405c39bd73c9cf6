//! GANs for MNIST digit generation
//!
//! Main entry point providing CLI interface for:
//! - Training the vanilla or conditional GAN
//! - Writing a default configuration file

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mnist_gan::{
    data::{load_train, DataLoader},
    model::{Gan, Variant},
    training::Trainer,
    utils::{Config, DirCheckpointSink, DirSampleSink, ExecutionContext},
};

/// Vanilla and conditional GANs on MNIST
#[derive(Parser)]
#[command(name = "mnist_gan")]
#[command(version = "0.1.0")]
#[command(about = "Train GANs that generate handwritten digits")]
struct Cli {
    /// Path to configuration file (.toml or .json)
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a GAN
    Train {
        /// Model variant: vanilla or conditional
        #[arg(long)]
        variant: Option<String>,

        /// Number of epochs
        #[arg(short, long)]
        epochs: Option<usize>,

        /// Directory holding the MNIST IDX files
        #[arg(short, long)]
        data_dir: Option<String>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Initialize default configuration file
    Init {
        /// Output configuration file path
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train {
            variant,
            epochs,
            data_dir,
            seed,
        } => {
            let mut config = Config::load_or_default(&cli.config)?;
            if let Some(variant) = variant {
                config.model.variant = variant.parse::<Variant>()?;
            }
            if let Some(epochs) = epochs {
                config.training.epochs = epochs;
            }
            if let Some(data_dir) = data_dir {
                config.data.data_dir = data_dir;
            }
            if let Some(seed) = seed {
                config.training.seed = seed;
            }
            train(config)?;
        }
        Commands::Init { output } => {
            Config::default().save(&output)?;
            info!("Created default configuration at {}", output);
        }
    }

    Ok(())
}

/// Train the configured GAN variant
fn train(config: Config) -> Result<()> {
    config.validate()?;

    let ctx = ExecutionContext::new(config.get_device(), config.training.seed);
    info!("Using device: {:?}", ctx.device());

    let dataset = load_train(&config.data.data_dir)?;
    let mut data_loader = DataLoader::new(
        dataset,
        config.data.batch_size,
        config.data.shuffle,
        config.data.drop_last,
        &ctx,
    );

    let mut gan = Gan::new(config.generator_config(), config.discriminator_config(), &ctx)?;
    info!(
        "Created {} GAN: latent_dim={}, image_size={}",
        gan.variant(),
        gan.latent_dim(),
        gan.image_size()
    );

    let mut checkpoints =
        DirCheckpointSink::new(&config.training.gen_ckpt_dir, &config.training.disc_ckpt_dir)?;
    let mut samples = DirSampleSink::new(&config.training.sample_dir)?;

    let mut trainer = Trainer::new(config.training_config(), ctx);
    let metrics = trainer.train(&mut gan, &mut data_loader, &mut checkpoints, &mut samples)?;

    info!(
        "Training complete. Final G_loss: {:.4}, D_loss: {:.4}",
        metrics.latest_gen_loss().unwrap_or(0.0),
        metrics.latest_disc_loss().unwrap_or(0.0)
    );

    Ok(())
}
