use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::{ApiClient, Result, gallery::Page};

/// A paginated listing that can be fetched one page at a time.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetch page `page` (1-based) holding at most `limit` items.
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<T>>;
}

/// Pages served over HTTP as `GET <endpoint>?page=<n>&limit=<l>`.
#[derive(Debug, Clone)]
pub struct HttpPageSource<T> {
    client: ApiClient,
    endpoint: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> HttpPageSource<T> {
    pub fn new(client: ApiClient, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            _item: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, page: u32, limit: u32) -> RequestBuilder {
        self.client
            .request(&self.endpoint, &[("page", page), ("limit", limit)])
    }
}

#[async_trait]
impl<T> PageSource<T> for HttpPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<T>> {
        self.client.send_json(self.request(page, limit)).await
    }
}
