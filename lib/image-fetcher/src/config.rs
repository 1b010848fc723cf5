use crate::{FetchError, Result};
use chrono::NaiveDate;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Seconds per hour that the call budget is spread over by the throttle.
const THROTTLE_WINDOW_SECS: f64 = 1800.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct FetchConfig {
    #[derivative(Default(value = "1024"))]
    pub target_width: u32,

    #[derivative(Default(value = "768"))]
    pub target_height: u32,

    /// Maximum search API calls per hour before the loop pauses.
    #[derivative(Default(value = "2500"))]
    pub rate_limit_per_hour: u32,

    /// Download attempts per candidate.
    #[derivative(Default(value = "3"))]
    pub download_retries: u32,

    #[derivative(Default(value = "100"))]
    pub target_image_count: u64,

    #[derivative(Default(value = "PathBuf::from(\"images\")"))]
    pub output_directory: PathBuf,

    /// Stop after this many date lookups even if the target is not reached.
    /// `None` keeps looking forever.
    pub max_attempts: Option<u64>,

    #[derivative(Default(value = "2.0"))]
    pub retry_backoff_secs: f64,

    #[derivative(Default(value = "1200.0"))]
    pub budget_pause_secs: f64,

    #[derivative(Default(value = "10.0"))]
    pub download_timeout_secs: f64,

    /// Earliest date a random search date is picked from.
    #[derivative(Default(value = "epoch_default()"))]
    pub epoch: NaiveDate,
}

fn epoch_default() -> NaiveDate {
    NaiveDate::from_ymd_opt(2004, 2, 1).unwrap_or_default()
}

fn seconds(name: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| {
        FetchError::InvalidConfig(format!("{name} is not a valid number of seconds ({secs}): {e}"))
    })
}

impl FetchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_per_hour == 0 {
            return Err(FetchError::InvalidConfig(
                "rate_limit_per_hour must be greater than 0".to_string(),
            ));
        }

        if self.download_retries == 0 {
            return Err(FetchError::InvalidConfig(
                "download_retries must be greater than 0".to_string(),
            ));
        }

        if self.target_width == 0 || self.target_height == 0 {
            return Err(FetchError::InvalidConfig(format!(
                "target resolution {}x{} is empty",
                self.target_width, self.target_height
            )));
        }

        self.retry_backoff()?;
        self.budget_pause()?;
        self.download_timeout()?;

        Ok(())
    }

    /// Delay before every date lookup: `1800 / rate_limit_per_hour` seconds.
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_secs_f64(THROTTLE_WINDOW_SECS / self.rate_limit_per_hour.max(1) as f64)
    }

    pub fn retry_backoff(&self) -> Result<Duration> {
        seconds("retry_backoff_secs", self.retry_backoff_secs)
    }

    pub fn budget_pause(&self) -> Result<Duration> {
        seconds("budget_pause_secs", self.budget_pause_secs)
    }

    /// Per-request download timeout. Zero would fail every request.
    pub fn download_timeout(&self) -> Result<Duration> {
        let timeout = seconds("download_timeout_secs", self.download_timeout_secs)?;
        if timeout.is_zero() {
            return Err(FetchError::InvalidConfig(
                "download_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(timeout)
    }

    pub fn target_resolution(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }
}
