//! Search command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::lugi::{parse_search, LugiClient, PageSource};
use anyhow::{Context, Result};
use tracing::info;

/// Executes a product search.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, query: &str) -> Result<String> {
        let client = LugiClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_with_client(&client, query).await
    }

    /// Executes the search with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl PageSource, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            anyhow::bail!("Search query must not be empty");
        }

        info!("Searching for: {}", query);

        let html = client.search(query).await?;
        let hits = parse_search(&html, client.base_url(), self.config.max_results);

        info!("Found {} products", hits.len());

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_hits(&hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::lugi::SearchHit;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Mock page source for testing.
    struct MockSource {
        search_html: String,
        search_calls: AtomicU32,
    }

    impl MockSource {
        fn new(search_html: String) -> Self {
            Self { search_html, search_calls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl PageSource for MockSource {
        async fn search(&self, _query: &str) -> Result<String> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.search_html.clone())
        }

        async fn product(&self, _url: &str) -> Result<String> {
            anyhow::bail!("not used")
        }

        fn base_url(&self) -> &str {
            "https://lugi.com.ua"
        }
    }

    fn make_search_html(count: usize) -> String {
        (0..count)
            .map(|i| {
                format!(
                    r#"<div class="product-layout">
                        <div class="image"><a href="/item-{i}"><img src="/{i}.jpg"></a></div>
                        <div class="product-name"><a href="/item-{i}">Товар {i}</a></div>
                        <p class="price">{} грн</p>
                    </div>"#,
                    100 + i
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_search_command_basic() {
        let client = MockSource::new(make_search_html(3));
        let cmd = SearchCommand::new(Config { format: OutputFormat::Json, ..Config::default() });

        let output = cmd.execute_with_client(&client, "товар").await.unwrap();
        let hits: Vec<SearchHit> = serde_json::from_str(&output).unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].url, "https://lugi.com.ua/item-0");
        assert_eq!(hits[2].price, Some(102.0));
        assert_eq!(client.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_search_command_respects_max_results() {
        let client = MockSource::new(make_search_html(15));
        let cmd = SearchCommand::new(Config {
            format: OutputFormat::Json,
            max_results: 5,
            ..Config::default()
        });

        let output = cmd.execute_with_client(&client, "товар").await.unwrap();
        let hits: Vec<SearchHit> = serde_json::from_str(&output).unwrap();
        assert_eq!(hits.len(), 5);
    }

    #[tokio::test]
    async fn test_search_command_no_results() {
        let client = MockSource::new("<html><body>Нічого не знайдено</body></html>".to_string());
        let cmd = SearchCommand::new(Config::default());

        let output = cmd.execute_with_client(&client, "xyz").await.unwrap();
        assert_eq!(output, "No products found.");
    }

    #[tokio::test]
    async fn test_search_command_empty_query() {
        let client = MockSource::new(String::new());
        let cmd = SearchCommand::new(Config::default());

        let result = cmd.execute_with_client(&client, "   ").await;
        assert!(result.is_err());
        assert_eq!(client.search_calls.load(Ordering::SeqCst), 0);
    }
}
