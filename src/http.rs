//! HTTP access to the directory services.
//!
//! Data sources only depend on the [`Fetch`] trait; [`HttpClient`] is the
//! real implementation, optionally backed by a [`ResponseCache`].

use std::time::Duration;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use url::Url;

use crate::cache::ResponseCache;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("dmrfill/", env!("CARGO_PKG_VERSION"));

/// Retrieves the body of a GET request.
pub trait Fetch {
    fn get(&self, url: &Url) -> Result<Vec<u8>>;
}

/// Blocking HTTP client with an optional response cache.
pub struct HttpClient {
    client: reqwest::blocking::Client,
    cache: Option<ResponseCache>,
}

impl HttpClient {
    pub fn new(cache: Option<ResponseCache>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client, cache })
    }

    fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        let network = |message: String| Error::Network {
            url: url.to_string(),
            message,
        };
        let response = self
            .client
            .get(url.as_str())
            .header("Accept", "application/json")
            .send()
            .map_err(|e| network(e.to_string()))?;

        let status = response.status();
        debug!("{} -> {}", url, status);
        if !status.is_success() {
            return Err(network(format!("HTTP status {}", status)));
        }
        let body = response.bytes().map_err(|e| network(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl Fetch for HttpClient {
    fn get(&self, url: &Url) -> Result<Vec<u8>> {
        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(url.as_str())? {
                debug!("Using cached response for {}", url);
                return Ok(body);
            }
        }
        debug!("GET {}", url);
        let body = self.fetch(url)?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(url.as_str(), &body) {
                warn!("Could not cache response for {}: {}", url, e);
            }
        }
        Ok(body)
    }
}

/// Fetches `url` and decodes the body as JSON.
pub fn get_json<T: DeserializeOwned>(fetch: &dyn Fetch, url: &Url, service: &str) -> Result<T> {
    let body = fetch.get(url)?;
    serde_json::from_slice(&body).map_err(|e| Error::Decode {
        service: service.to_string(),
        message: e.to_string(),
    })
}

/// Builds `base?k=v&...` with the parameters in order.
pub fn with_params<'a>(
    base: &str,
    params: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<Url> {
    let mut url = Url::parse(base)?;
    let mut params = params.into_iter().peekable();
    if params.peek().is_some() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}
