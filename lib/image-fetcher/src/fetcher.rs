use crate::{
    FetchConfig, FetchError, Result,
    download::{ImageDownloader, download_with_retry},
    search::{PhotoSearch, SearchQuery},
    sleeper::Sleeper,
};
use image::{ImageFormat, ImageResult};
use rand::Rng;
use std::{fs, path::PathBuf};

/// Search API calls charged to every date lookup: one for the page count and
/// one for the chosen page.
pub const API_CALLS_PER_ATTEMPT: u64 = 2;

const FILE_PREFIX: &str = "image";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSession {
    pub saved_count: u64,
    pub total_api_calls: u64,
    pub target_count: u64,
    pub attempts: u64,
}

impl FetchSession {
    pub fn new(target_count: u64) -> Self {
        Self {
            target_count,
            ..Default::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.saved_count >= self.target_count
    }
}

pub struct FetchLoop<S, D, Z, R> {
    config: FetchConfig,
    search: S,
    downloader: D,
    sleeper: Z,
    rng: R,
    session: FetchSession,
}

impl<S, D, Z, R> FetchLoop<S, D, Z, R>
where
    S: PhotoSearch,
    D: ImageDownloader,
    Z: Sleeper,
    R: Rng,
{
    pub fn new(config: FetchConfig, search: S, downloader: D, sleeper: Z, rng: R) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            session: FetchSession::new(config.target_image_count),
            config,
            search,
            downloader,
            sleeper,
            rng,
        })
    }

    /// Empties the output directory, then collects images until the target
    /// count (or the attempt cap) is reached.
    ///
    /// Candidate failures are logged and skipped. Only output directory and
    /// file write failures are returned.
    pub async fn run(&mut self) -> Result<FetchSession> {
        let output_dir = &self.config.output_directory;
        cutil::fs::recreate_dir(output_dir).map_err(|e| FetchError::OutputDirError {
            error: format!("{e:#}"),
            path: output_dir.display().to_string(),
        })?;

        self.session = FetchSession::new(self.config.target_image_count);
        let throttle = self.config.throttle_interval();

        log::info!(
            "Collecting {} images of {}x{} into {}",
            self.session.target_count,
            self.config.target_width,
            self.config.target_height,
            output_dir.display()
        );

        while !self.session.is_complete() {
            if let Some(max_attempts) = self.config.max_attempts {
                if self.session.attempts >= max_attempts {
                    log::warn!(
                        "Stopping after {max_attempts} attempts with {}/{} images",
                        self.session.saved_count,
                        self.session.target_count
                    );
                    break;
                }
            }

            self.sleeper.sleep(throttle).await;
            self.session.attempts += 1;
            self.session.total_api_calls += API_CALLS_PER_ATTEMPT;

            self.attempt().await?;
            self.check_budget().await?;
        }

        log::info!("Fetch finished: {:?}", self.session);
        Ok(self.session.clone())
    }

    async fn attempt(&mut self) -> Result<()> {
        let Some(url) = self.find_candidate().await else {
            return Ok(());
        };

        let Some(bytes) = download_with_retry(
            &self.downloader,
            &self.sleeper,
            &url,
            self.config.download_retries,
            self.config.retry_backoff()?,
        )
        .await
        else {
            log::debug!("No response from {url}, skipping");
            return Ok(());
        };

        let (format, width, height) = match inspect(&bytes) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Failed to process image from {url}: {e}");
                return Ok(());
            }
        };

        if (width, height) != self.config.target_resolution() {
            log::debug!("Skipping {url}: resolution is {width}x{height}");
            return Ok(());
        }

        let index = self.session.saved_count + 1;
        let path = self.file_path(index, format);
        fs::write(&path, &bytes).map_err(|e| FetchError::SaveError {
            error: e,
            path: path.display().to_string(),
        })?;

        self.session.saved_count = index;
        log::info!("Downloaded and saved image {index} with resolution {width}x{height}");

        Ok(())
    }

    /// Picks a random date and page and returns the photo URL found there.
    async fn find_candidate(&mut self) -> Option<String> {
        let date = cutil::time::random_date(&mut self.rng, self.config.epoch, cutil::time::today());
        let date = cutil::time::format_date(date);

        let first = match self.search.search(&SearchQuery::for_date(&date, 1)).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Error fetching photos: {e}");
                return None;
            }
        };

        if first.pages == 0 {
            log::debug!("No photos taken on {date}");
            return None;
        }

        let page = self.rng.random_range(1..=first.pages);
        log::debug!("Searching {date}, page {page}/{}", first.pages);

        let selected = match self.search.search(&SearchQuery::for_date(&date, page)).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Error fetching photos: {e}");
                return None;
            }
        };

        match selected.photos.into_iter().next() {
            Some(photo) => Some(photo.image_url()),
            None => {
                log::debug!("Page {page} for {date} is empty");
                None
            }
        }
    }

    async fn check_budget(&mut self) -> Result<()> {
        if self.session.total_api_calls < u64::from(self.config.rate_limit_per_hour) {
            return Ok(());
        }

        let pause = self.config.budget_pause()?;
        log::info!(
            "API rate limit reached after {} calls. Pausing for {}s...",
            self.session.total_api_calls,
            pause.as_secs()
        );

        self.sleeper.sleep(pause).await;
        self.session.total_api_calls = 0;
        Ok(())
    }

    fn file_path(&self, index: u64, format: ImageFormat) -> PathBuf {
        cutil::fs::sequential_file_path(
            &self.config.output_directory,
            FILE_PREFIX,
            index,
            extension(format),
        )
    }
}

/// Lowercase format name used as the file extension, e.g. `jpeg` or `png`.
fn extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        other => other.extensions_str().first().copied().unwrap_or("img"),
    }
}

/// Decodes `bytes` and returns the detected format and pixel dimensions.
fn inspect(bytes: &[u8]) -> ImageResult<(ImageFormat, u32, u32)> {
    let format = image::guess_format(bytes)?;
    let image = image::load_from_memory_with_format(bytes, format)?;
    Ok((format, image.width(), image.height()))
}
