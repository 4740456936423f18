//! Shared HTTP client for the Kenavo site and its hosted REST tables.

use reqwest::{
    Client, RequestBuilder,
    header::{AUTHORIZATION, CACHE_CONTROL, PRAGMA},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{Cfg, Error, Result};

/// Process-wide handle for talking to the backend.
///
/// Construct it once from the configuration at startup and clone it into whatever needs
/// network access; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    key: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, key: Option<&str>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.map(str::to_string),
        }
    }

    pub fn from_config(cfg: &Cfg) -> Result<Self> {
        let cfg = cfg.read();
        let base_url = cfg
            .api
            .base_url
            .as_deref()
            .ok_or(Error::MissingConfig("api.base_url"))?;

        Ok(Self::new(base_url, cfg.api.key.as_deref()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `path` against the base URL. Absolute URLs are passed through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Start a GET request that bypasses any intermediate caches.
    pub fn get(&self, path: &str) -> RequestBuilder {
        let mut request = self
            .http
            .get(self.url(path))
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache");

        if let Some(key) = &self.key {
            request = request
                .header("apikey", key)
                .header(AUTHORIZATION, format!("Bearer {key}"));
        }

        request
    }

    /// Cache-bypassing GET for `path` with `query` encoded into the URL.
    pub fn request<Q>(&self, path: &str, query: &Q) -> RequestBuilder
    where
        Q: serde::Serialize + ?Sized,
    {
        self.get(path).query(query)
    }

    /// Send a prepared request and decode the JSON body of a successful response.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();

        debug!("GET {url} -> {status}");

        if !status.is_success() {
            return Err(Error::Status { status, url });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod test {
    use super::ApiClient;
    use crate::{CoreConfig, Error};

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("https://kenavo.example/", None);

        assert_eq!(client.base_url(), "https://kenavo.example");
        assert_eq!(
            client.url("/api/gallery/albums"),
            "https://kenavo.example/api/gallery/albums"
        );
        assert_eq!(client.url("rest/v1/profiles"), "https://kenavo.example/rest/v1/profiles");
        assert_eq!(client.url("https://other.example/x"), "https://other.example/x");
    }

    #[test]
    fn test_from_config_requires_base_url() {
        let cfg = CoreConfig::default().into_handle();

        assert!(matches!(
            ApiClient::from_config(&cfg),
            Err(Error::MissingConfig("api.base_url"))
        ));
    }

    #[test]
    fn test_cache_bypass_and_key_headers() {
        let client = ApiClient::new("https://kenavo.example", Some("anon"));
        let request = client.get("/api/gallery/albums").build().unwrap();

        assert_eq!(request.headers().get("cache-control").unwrap(), "no-cache");
        assert_eq!(request.headers().get("apikey").unwrap(), "anon");
        assert_eq!(request.headers().get("authorization").unwrap(), "Bearer anon");
    }
}
