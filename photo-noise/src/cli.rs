use clap::{Args, Parser, Subcommand};
use image_fetcher::FetchConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "photo-noise", version, about = "Synthetic image noise and random Flickr photo collection")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download random Flickr photos that match the target resolution
    Fetch(FetchArgs),

    /// Write noisy copies of an image, one per noise model
    Noise(NoiseArgs),

    /// Write the default configuration to a file
    InitConfig {
        #[arg(default_value = "photo-noise.toml")]
        path: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// Number of images to collect
    #[arg(short = 'n', long)]
    pub count: Option<u64>,

    /// Output directory, emptied before the run
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Give up after this many date lookups
    #[arg(long)]
    pub max_attempts: Option<u64>,

    /// Seed for date and page selection
    #[arg(long)]
    pub seed: Option<u64>,
}

impl FetchArgs {
    /// Overrides the file/default values with the flags that were given.
    pub fn apply(&self, config: &mut FetchConfig) {
        if let Some(count) = self.count {
            config.target_image_count = count;
        }
        if let Some(output) = &self.output {
            config.output_directory = output.clone();
        }
        if let Some(width) = self.width {
            config.target_width = width;
        }
        if let Some(height) = self.height {
            config.target_height = height;
        }
        if self.max_attempts.is_some() {
            config.max_attempts = self.max_attempts;
        }
    }
}

#[derive(Args, Debug)]
pub struct NoiseArgs {
    /// Image to add noise to
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for `<model>.jpg` outputs
    #[arg(short = 'd', long)]
    pub output_dir: Option<PathBuf>,

    /// Noise model, repeatable: gaussian, salt_and_pepper, poisson, speckle
    #[arg(short, long = "model")]
    pub models: Vec<String>,

    #[arg(long)]
    pub seed: Option<u64>,
}
