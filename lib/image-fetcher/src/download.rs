use crate::{DownloadError, FetchError, Result, sleeper::Sleeper};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

#[async_trait]
pub trait ImageDownloader {
    async fn get(&self, url: &str) -> std::result::Result<Bytes, DownloadError>;
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(timeout: Duration) -> Result<HttpDownloader> {
        let client =
            cutil::http::client(timeout).map_err(|e| FetchError::ClientError(e.to_string()))?;
        Ok(HttpDownloader { client })
    }
}

fn classify(url: &str, error: reqwest::Error) -> DownloadError {
    if cutil::http::is_name_resolution_error(&error) {
        DownloadError::Unreachable {
            url: url.to_string(),
            reason: error.to_string(),
        }
    } else {
        DownloadError::Request {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

#[async_trait]
impl ImageDownloader for HttpDownloader {
    async fn get(&self, url: &str) -> std::result::Result<Bytes, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| classify(url, e))
    }
}

/// GETs `url` up to `retries` times.
///
/// Every failed attempt is followed by a `backoff` sleep. A name resolution
/// failure gives up immediately. Returns `None` when no attempt succeeded.
pub async fn download_with_retry<D, Z>(
    downloader: &D,
    sleeper: &Z,
    url: &str,
    retries: u32,
    backoff: Duration,
) -> Option<Bytes>
where
    D: ImageDownloader + ?Sized,
    Z: Sleeper + ?Sized,
{
    for attempt in 1..=retries {
        match downloader.get(url).await {
            Ok(bytes) => return Some(bytes),
            Err(e) if e.is_unreachable() => {
                log::warn!("{e}");
                break;
            }
            Err(e) => {
                log::warn!("Attempt {attempt} failed: {e}");
                sleeper.sleep(backoff).await;
            }
        }
    }

    None
}
