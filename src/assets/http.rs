use std::{sync::Arc, time::Duration};

use reqwest::header::{ACCESS_CONTROL_ALLOW_ORIGIN, HeaderMap, HeaderValue, ORIGIN};

use crate::{
    assets::resolve::{FetchedResource, ResourceResolver, cors_permits, is_remote_url},
    foundation::error::{FrameshotError, FrameshotResult},
};

/// Default request timeout for [`HttpResolver`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches remote resources over HTTP(S), performing a CORS-mode request.
///
/// The request carries an `Origin` header; the response is CORS-readable only when its
/// `Access-Control-Allow-Origin` permits that origin.
#[derive(Clone, Debug)]
pub struct HttpResolver {
    client: reqwest::blocking::Client,
}

impl HttpResolver {
    /// Resolver with [`DEFAULT_TIMEOUT`].
    pub fn new() -> FrameshotResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Resolver with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> FrameshotResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("frameshot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FrameshotError::resource(format!("build http client: {e}")))?;
        Ok(Self { client })
    }
}

impl ResourceResolver for HttpResolver {
    #[tracing::instrument(skip(self))]
    fn fetch(&self, url: &str, origin: &str) -> FrameshotResult<FetchedResource> {
        if !is_remote_url(url) {
            return Err(FrameshotError::resource(format!(
                "'{url}' is not an http(s) url"
            )));
        }

        let response = self
            .client
            .get(url)
            .header(ORIGIN, origin_header(origin)?)
            .send()
            .map_err(|e| FrameshotError::resource(format!("GET '{url}': {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FrameshotError::resource(format!(
                "GET '{url}': status {status}"
            )));
        }

        let cors_readable = response_permits(origin, response.headers());

        let bytes = response
            .bytes()
            .map_err(|e| FrameshotError::resource(format!("read body of '{url}': {e}")))?;
        tracing::debug!(len = bytes.len(), cors_readable, "resource fetched");

        Ok(FetchedResource {
            bytes: Arc::new(bytes.to_vec()),
            cors_readable,
        })
    }
}

fn origin_header(origin: &str) -> FrameshotResult<HeaderValue> {
    HeaderValue::from_str(origin.trim()).map_err(|_| {
        FrameshotError::validation(format!("origin '{origin}' is not a valid header value"))
    })
}

fn response_permits(origin: &str, headers: &HeaderMap) -> bool {
    let allow = headers
        .get(ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok());
    cors_permits(origin, allow)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/http.rs"]
mod tests;
