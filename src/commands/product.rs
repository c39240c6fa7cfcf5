//! Product page command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::lugi::{LugiClient, PageSource, Parser, Product};
use crate::smart::SmartParser;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Fetches and parses product pages.
pub struct ProductCommand {
    config: Config,
}

impl ProductCommand {
    /// Creates a new product command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches the given product URLs and returns formatted output.
    pub async fn execute(&self, urls: &[String]) -> Result<String> {
        let client = LugiClient::new(&self.config).await.context("Failed to create HTTP client")?;
        let smart = SmartParser::new(&self.config);

        self.execute_with(&client, &smart, urls).await
    }

    /// Fetches products with a provided source and parser (for testing).
    ///
    /// A single URL fails loudly; in a batch, failures are reported and skipped.
    pub async fn execute_with(
        &self,
        source: &impl PageSource,
        smart: &SmartParser,
        urls: &[String],
    ) -> Result<String> {
        let formatter = Formatter::new(self.config.format);

        if let [url] = urls {
            let product = fetch_product(source, smart, url).await?;
            return Ok(formatter.format_product(&product));
        }

        let mut products: Vec<Product> = Vec::new();
        for url in urls {
            match fetch_product(source, smart, url).await {
                Ok(product) => products.push(product),
                Err(e) => eprintln!("Failed to process {}: {:#}", url, e),
            }
        }

        Ok(formatter.format_products(&products))
    }

    /// Parses a saved product page without touching the network.
    pub fn execute_file(&self, smart: &SmartParser, path: &Path, url: Option<&str>) -> Result<String> {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read HTML file: {}", path.display()))?;

        let url = url.map(str::to_string).unwrap_or_else(|| path.display().to_string());
        let parser = Parser::new(smart, &self.config.base_url);
        let product = parser.parse_product_page(&html, &url)?;

        Ok(Formatter::new(self.config.format).format_product(&product))
    }
}

async fn fetch_product(source: &impl PageSource, smart: &SmartParser, url: &str) -> Result<Product> {
    let url = url.trim();
    if url.is_empty() {
        anyhow::bail!("Empty product URL");
    }

    info!("Looking up product: {}", url);

    let html = source.product(url).await?;
    let url = crate::lugi::parser::join_url(source.base_url(), url);

    // Html is !Send, so parsing stays out of the awaited section
    let parser = Parser::new(smart, source.base_url());
    parser.parse_product_page(&html, &url)
}
