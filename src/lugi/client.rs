//! HTTP client for LUGI pages.

use crate::config::Config;
use crate::lugi::parser::join_url;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

/// Source of raw store HTML - enables mocking for tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches the search results page for `query`.
    async fn search(&self, query: &str) -> Result<String>;

    /// Fetches a product page. Relative URLs resolve against the base URL.
    async fn product(&self, url: &str) -> Result<String>;

    /// Store base URL.
    fn base_url(&self) -> &str;
}

/// LUGI HTTP client.
pub struct LugiClient {
    client: Client,
    base_url: String,
}

impl LugiClient {
    /// Creates a client from the configured base URL, timeout and proxy.
    pub async fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("User-Agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36")
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "uk-UA,uk;q=0.9,ru;q=0.8,en;q=0.7")
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 429 || status == 503 {
            warn!("Rate limited ({}). Consider using a proxy.", status);
            anyhow::bail!("Rate limited by store (status {}). Try again later or use a proxy.", status);
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl PageSource for LugiClient {
    async fn search(&self, query: &str) -> Result<String> {
        let url = format!("{}/search/?search={}", self.base_url, urlencoding::encode(query));

        info!("Searching: {}", query);
        self.get(&url).await
    }

    async fn product(&self, url: &str) -> Result<String> {
        let url = join_url(&self.base_url, url);

        info!("Fetching product: {}", url);
        self.get(&url).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_test_config(base_url: String) -> Config {
        Config { base_url, timeout_secs: 5, ..Config::default() }
    }

    #[test]
    fn test_url_encoding() {
        assert_eq!(urlencoding::encode("куртка зимова"), "%D0%BA%D1%83%D1%80%D1%82%D0%BA%D0%B0%20%D0%B7%D0%B8%D0%BC%D0%BE%D0%B2%D0%B0");
    }

    #[tokio::test]
    async fn test_search_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/"))
            .and(query_param("search", "куртка"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<div class="product-layout"><a href="/kurtka">Куртка</a></div>"#),
            )
            .mount(&mock_server)
            .await;

        let client = LugiClient::new(&make_test_config(mock_server.uri())).await.unwrap();

        let body = client.search("куртка").await.unwrap();
        assert!(body.contains("product-layout"));
    }

    #[tokio::test]
    async fn test_product_relative_and_absolute() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/kurtka"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Куртка зимова</h1>"))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = LugiClient::new(&make_test_config(mock_server.uri())).await.unwrap();

        assert!(client.product("/kurtka").await.unwrap().contains("Куртка"));
        let absolute = format!("{}/kurtka", mock_server.uri());
        assert!(client.product(&absolute).await.unwrap().contains("Куртка"));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let client = LugiClient::new(&make_test_config(mock_server.uri())).await.unwrap();

        let err = client.search("test").await.unwrap_err();
        assert!(err.to_string().contains("Rate limited"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = LugiClient::new(&make_test_config(mock_server.uri())).await.unwrap();

        let err = client.product("/missing").await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash() {
        let config = make_test_config("https://lugi.com.ua/".to_string());
        let client = LugiClient::new(&config).await.unwrap();
        assert_eq!(client.base_url(), "https://lugi.com.ua");
    }
}
