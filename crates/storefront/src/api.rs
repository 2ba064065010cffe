//! Catalog fetch over HTTP.

use std::time::Duration;

use async_trait::async_trait;

use bookstore_catalog::{Book, CatalogSource, FetchError};

use crate::config::StorefrontConfig;

/// Fetches the full catalog from the backend `items/` endpoint.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl HttpCatalogSource {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn from_config(config: &StorefrontConfig) -> Result<Self, FetchError> {
        let source = Self::new(config.api_url.clone(), config.http_timeout)?;
        Ok(match &config.auth_token {
            Some(token) => source.with_token(token.clone()),
            None => source,
        })
    }

    pub fn items_url(&self) -> String {
        format!("{}/items/", self.api_url)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_books(&self) -> Result<Vec<Book>, FetchError> {
        let url = self.items_url();
        let mut req = self.client.get(&url);

        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        tracing::debug!(%url, "fetching catalog");
        let resp = req.send().await.map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Api(
                status.as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }

        resp.json::<Vec<Book>>()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_url_tolerates_trailing_slash() {
        let source = HttpCatalogSource::new("http://127.0.0.1:80/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.items_url(), "http://127.0.0.1:80/items/");
    }
}
