//! HTTP fetcher for assets served next to the web viewer

use std::sync::Arc;

use super::{AssetBytes, AssetFetcher, FetchError};
use crate::catalog::AssetId;

/// Fetches `{base_url}{id}` over HTTP. URL identifiers are fetched verbatim.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Full URL for an identifier
    pub fn url_for(&self, id: &AssetId) -> String {
        if id.is_url() {
            id.as_str().to_string()
        } else {
            format!("{}{}", self.base_url, id)
        }
    }
}

#[async_trait::async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, id: &AssetId) -> Result<AssetBytes, FetchError> {
        let url = self.url_for(id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(id.clone()));
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                id: id.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Arc::from(body.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_base() {
        let fetcher = HttpFetcher::new("https://shop.example.com/models/");
        let id = AssetId::parse("X_Egg.glb").unwrap();
        assert_eq!(fetcher.url_for(&id), "https://shop.example.com/models/X_Egg.glb");
    }

    #[test]
    fn test_url_for_keeps_absolute_ids() {
        let fetcher = HttpFetcher::new("https://shop.example.com");
        let id = AssetId::parse("https://cdn.example.com/a.glb").unwrap();
        assert_eq!(fetcher.url_for(&id), "https://cdn.example.com/a.glb");
    }
}
