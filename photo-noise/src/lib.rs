pub mod cli;
pub mod config;

use anyhow::{Context, Result};
use cli::{Cli, Command, FetchArgs, NoiseArgs};
use config::Config;
use image_fetcher::{FetchLoop, FetchSession, FlickrSearch, HttpDownloader, TokioSleeper};
use image_noise::{Noise, NoiseModel, RngNoise, array_to_rgb8, load_image_array};
use rand::{SeedableRng, rngs::StdRng};
use std::{fs, path::PathBuf};

/// Initializes the logger.
///
/// Sets up a custom logger format with timestamp, log level, file name, line number,
/// and log message. Uses local time format for timestamps. Defaults to `info`,
/// overridable through `RUST_LOG`.
pub fn init_logger() {
    use std::io::Write;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("reqwest", log::LevelFilter::Warn)
        .filter_module("hyper_util", log::LevelFilter::Warn)
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = cutil::time::local_now("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Fetch(args) => {
            fetch(config, &args).await?;
        }
        Command::Noise(args) => {
            noise(config, &args)?;
        }
        Command::InitConfig { path } => {
            config.save(&path)?;
            log::info!("Wrote default configuration to {}", path.display());
        }
    }

    Ok(())
}

pub async fn fetch(mut config: Config, args: &FetchArgs) -> Result<FetchSession> {
    args.apply(&mut config.fetch);

    let api_key = config::api_key_from_env()?;
    let search = FlickrSearch::new(api_key, config.flickr.request_timeout()?)?
        .with_endpoint(&config.flickr.endpoint);
    let downloader = HttpDownloader::new(config.fetch.download_timeout()?)?;
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut fetch_loop = FetchLoop::new(config.fetch, search, downloader, TokioSleeper, rng)?;
    let session = fetch_loop.run().await?;

    log::info!(
        "Saved {}/{} images in {} attempts",
        session.saved_count,
        session.target_count,
        session.attempts
    );

    Ok(session)
}

/// Writes `<output_dir>/<model>.jpg` for every requested model and returns the paths.
pub fn noise(config: Config, args: &NoiseArgs) -> Result<Vec<PathBuf>> {
    let image = load_image_array(&args.input)
        .with_context(|| format!("load {} failed", args.input.display()))?;

    let names = if args.models.is_empty() {
        config.noise.models
    } else {
        args.models.clone()
    };

    // Parse every name first so a typo fails before anything is written
    let models = names
        .iter()
        .map(|name| name.parse::<NoiseModel>())
        .collect::<Result<Vec<_>, _>>()?;

    let output_dir = args.output_dir.clone().unwrap_or(config.noise.output_dir);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("create {} failed", output_dir.display()))?;

    let mut source = match args.seed.or(config.noise.seed) {
        Some(seed) => RngNoise::seeded(seed),
        None => RngNoise::from_os_rng(),
    };

    let mut outputs = Vec::with_capacity(models.len());
    for model in models {
        let noisy = model.apply(&image, &mut source)?;
        let path = output_dir.join(format!("{}.jpg", model.name()));

        array_to_rgb8(&noisy)?
            .save(&path)
            .with_context(|| format!("save {} failed", path.display()))?;

        log::info!("Wrote {} noise to {}", model, path.display());
        outputs.push(path);
    }

    Ok(outputs)
}
