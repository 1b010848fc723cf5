use anyhow::{Context, Result, bail};
use derivative::Derivative;
use image_fetcher::{FetchConfig, search::FLICKR_REST_ENDPOINT};
use image_noise::NoiseModel;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Environment variables holding the Flickr API key, in lookup order.
pub const API_KEY_VARS: [&str; 2] = ["flickr_key", "FLICKR_KEY"];

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub flickr: Flickr,
    pub noise: Noise,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Flickr {
    #[derivative(Default(value = "FLICKR_REST_ENDPOINT.to_string()"))]
    pub endpoint: String,

    #[derivative(Default(value = "10.0"))]
    pub request_timeout_secs: f64,
}

impl Flickr {
    pub fn request_timeout(&self) -> Result<Duration> {
        let timeout = Duration::try_from_secs_f64(self.request_timeout_secs)
            .with_context(|| format!("invalid request_timeout_secs {}", self.request_timeout_secs))?;
        if timeout.is_zero() {
            bail!("request_timeout_secs must be greater than 0");
        }
        Ok(timeout)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Noise {
    #[derivative(Default(value = "PathBuf::from(\".\")"))]
    pub output_dir: PathBuf,

    #[derivative(Default(value = "models_default()"))]
    pub models: Vec<String>,

    pub seed: Option<u64>,
}

fn models_default() -> Vec<String> {
    NoiseModel::NAMES.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {} failed", path.display()))?;
        let config = toml::from_str::<Config>(&text)
            .with_context(|| format!("parse config file {} failed", path.display()))?;

        debug!("{:?}", config);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("write {} failed", path.display()))
    }
}

/// Reads the Flickr API key from the environment.
pub fn api_key_from_env() -> Result<String> {
    for var in API_KEY_VARS {
        if let Ok(key) = env::var(var) {
            if !key.trim().is_empty() {
                return Ok(key.trim().to_string());
            }
        }
    }

    bail!("Flickr API key not set, export one of {}", API_KEY_VARS.join(" or "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_path_gives_defaults() -> Result<()> {
        let config = Config::load(None)?;
        assert_eq!(config, Config::default());
        assert_eq!(config.noise.models.len(), 4);
        assert_eq!(config.flickr.endpoint, FLICKR_REST_ENDPOINT);
        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("photo-noise.toml");
        fs::write(
            &path,
            r#"
[fetch]
target_image_count = 25
output_directory = "/tmp/flickr"
max_attempts = 1000
epoch = "2008-01-01"

[noise]
models = ["gauss", "s&p"]
seed = 7
"#,
        )?;

        let config = Config::load(Some(&path))?;
        assert_eq!(config.fetch.target_image_count, 25);
        assert_eq!(config.fetch.output_directory, PathBuf::from("/tmp/flickr"));
        assert_eq!(config.fetch.max_attempts, Some(1000));
        assert_eq!(config.fetch.epoch.to_string(), "2008-01-01");
        assert_eq!(config.fetch.target_resolution(), (1024, 768));
        assert_eq!(config.fetch.rate_limit_per_hour, 2500);
        assert_eq!(config.noise.models, vec!["gauss", "s&p"]);
        assert_eq!(config.noise.seed, Some(7));
        assert_eq!(config.flickr, Flickr::default());
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("photo-noise.toml");

        let mut config = Config::default();
        config.fetch.target_width = 640;
        config.fetch.target_height = 480;
        config.noise.seed = Some(99);
        config.save(&path)?;

        assert_eq!(Config::load(Some(&path))?, config);
        Ok(())
    }

    #[test]
    fn test_bad_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[fetch]\ntarget_width = \"wide\"\n")?;

        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
        Ok(())
    }

    #[test]
    fn test_request_timeout() -> Result<()> {
        assert_eq!(Flickr::default().request_timeout()?, Duration::from_secs(10));

        let flickr = Flickr {
            request_timeout_secs: -1.0,
            ..Default::default()
        };
        assert!(flickr.request_timeout().is_err());

        let flickr = Flickr {
            request_timeout_secs: 0.0,
            ..Default::default()
        };
        assert!(flickr.request_timeout().is_err());

        let flickr = Flickr {
            request_timeout_secs: 1e20,
            ..Default::default()
        };
        assert!(flickr.request_timeout().is_err());
        Ok(())
    }
}
