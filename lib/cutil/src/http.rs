//! HTTP client utilities for building clients and classifying request failures.

use anyhow::Result;
use reqwest::{
    Client,
    header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue, USER_AGENT},
};
use std::{error::Error, time::Duration};

/// Creates a set of common HTTP headers for web requests.
///
/// The headers include:
/// - User-Agent: Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36
/// - Accept: */*
/// - Cache-Control: no-cache
///
/// # Examples
///
/// ```
/// use cutil::http::headers;
///
/// let headers = headers();
/// assert!(headers.contains_key("user-agent"));
/// ```
pub fn headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Safari/537.36"));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// Creates a new HTTP client with the common headers and a per-request timeout.
pub fn client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .default_headers(headers())
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Returns `true` when any error in the `source()` chain reports a failed
/// host name lookup.
///
/// Resolver failures surface from hyper as `dns error: ...` and from the
/// system resolver as `failed to lookup address information`.
pub fn is_name_resolution_error(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);

    while let Some(e) = current {
        let msg = e.to_string().to_lowercase();
        if msg.contains("dns error")
            || msg.contains("failed to lookup address")
            || msg.contains("name or service not known")
            || msg.contains("no such host")
        {
            return true;
        }
        current = e.source();
    }

    false
}
