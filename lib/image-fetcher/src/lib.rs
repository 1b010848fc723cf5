pub mod config;
pub mod download;
pub mod fetcher;
pub mod search;
pub mod sleeper;

pub use config::FetchConfig;
pub use download::{HttpDownloader, ImageDownloader, download_with_retry};
pub use fetcher::{API_CALLS_PER_ATTEMPT, FetchLoop, FetchSession};
pub use search::{CandidatePhoto, FlickrSearch, PhotoSearch, SearchPage, SearchQuery};
pub use sleeper::{Sleeper, TokioSleeper};

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to build HTTP client. Error: {0}")]
    ClientError(String),

    #[error("HTTP request {url} failed. Error: {error}")]
    RequestError { error: reqwest::Error, url: String },

    #[error("Flickr API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Unexpected API response: {0}")]
    Response(String),

    #[error("Failed to prepare output directory: {path}. Error: {error}")]
    OutputDirError { error: String, path: String },

    #[error("Failed to save image: {path}. Error: {error}")]
    SaveError { error: std::io::Error, path: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    #[error("Name resolution failed for {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("HTTP request {url} failed. Error: {reason}")]
    Request { url: String, reason: String },

    #[error("HTTP request {url} returned status {status}")]
    Status { url: String, status: u16 },
}

impl DownloadError {
    /// The host could not be resolved; retrying the same URL is pointless.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, DownloadError::Unreachable { .. })
    }
}
