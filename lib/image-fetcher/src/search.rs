use crate::{FetchError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

pub const FLICKR_REST_ENDPOINT: &str = "https://api.flickr.com/services/rest/";
pub const IMAGE_HOST: &str = "live.staticflickr.com";

/// One page of a date-bounded photo search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub min_taken_date: String,
    pub max_taken_date: String,
    pub per_page: u32,
    pub page: u32,
}

impl SearchQuery {
    /// Photos taken on exactly `date`, one photo per page.
    pub fn for_date(date: &str, page: u32) -> Self {
        Self {
            min_taken_date: date.to_string(),
            max_taken_date: date.to_string(),
            per_page: 1,
            page,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub pages: u32,
    pub photos: Vec<CandidatePhoto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CandidatePhoto {
    #[serde(rename = "server")]
    pub server_id: String,

    #[serde(rename = "id")]
    pub photo_id: String,

    pub secret: String,
}

impl CandidatePhoto {
    pub fn new(server_id: impl ToString, photo_id: impl ToString, secret: impl ToString) -> Self {
        Self {
            server_id: server_id.to_string(),
            photo_id: photo_id.to_string(),
            secret: secret.to_string(),
        }
    }

    /// Direct URL of the large (`_b`, 1024 px long edge) rendition.
    pub fn image_url(&self) -> String {
        format!(
            "https://{IMAGE_HOST}/{}/{}_{}_b.jpg",
            self.server_id, self.photo_id, self.secret
        )
    }
}

#[async_trait]
pub trait PhotoSearch {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage>;
}

#[derive(Deserialize)]
struct FlickrResponse {
    stat: String,
    photos: Option<FlickrPhotos>,
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct FlickrPhotos {
    #[serde(deserialize_with = "number_or_string")]
    pages: u32,

    #[serde(default)]
    photo: Vec<CandidatePhoto>,
}

// Older API responses quote numeric fields
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Number(u32),
        Text(String),
    }

    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n),
        Value::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Parses a `flickr.photos.search` JSON body.
pub fn parse_search_response(body: &str) -> Result<SearchPage> {
    let response: FlickrResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Response(e.to_string()))?;

    if response.stat != "ok" {
        return Err(FetchError::Api {
            code: response.code.unwrap_or_default(),
            message: response.message.unwrap_or(response.stat),
        });
    }

    let photos = response
        .photos
        .ok_or_else(|| FetchError::Response("missing `photos` field".to_string()))?;

    Ok(SearchPage {
        pages: photos.pages,
        photos: photos.photo,
    })
}

/// `PhotoSearch` backed by the Flickr REST API.
#[derive(Debug, Clone)]
pub struct FlickrSearch {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl FlickrSearch {
    pub fn new(api_key: impl ToString, timeout: Duration) -> Result<Self> {
        let client =
            cutil::http::client(timeout).map_err(|e| FetchError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: FLICKR_REST_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl ToString) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn request_url(&self, query: &SearchQuery) -> Result<Url> {
        let per_page = query.per_page.to_string();
        let page = query.page.to_string();

        let params = [
            ("method", "flickr.photos.search"),
            ("api_key", self.api_key.as_str()),
            ("min_taken_date", query.min_taken_date.as_str()),
            ("max_taken_date", query.max_taken_date.as_str()),
            ("per_page", per_page.as_str()),
            ("page", page.as_str()),
            ("format", "json"),
            ("nojsoncallback", "1"),
        ];

        Url::parse_with_params(&self.endpoint, &params)
            .map_err(|e| FetchError::InvalidConfig(format!("bad endpoint {}: {e}", self.endpoint)))
    }
}

#[async_trait]
impl PhotoSearch for FlickrSearch {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let url = self.request_url(query)?;
        let request_error = |error| FetchError::RequestError {
            error,
            url: self.endpoint.clone(),
        };

        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(request_error)?
            .text()
            .await
            .map_err(request_error)?;

        parse_search_response(&body)
    }
}
