//! Pattern store inspection and offline learning.

use crate::config::Config;
use crate::format::Formatter;
use crate::lugi::Parser;
use crate::smart::{check, SmartParser};
use anyhow::{Context, Result};
use scraper::Html;
use std::path::Path;
use tracing::info;

/// Works on the pattern store with saved HTML files.
pub struct PatternsCommand {
    config: Config,
}

impl PatternsCommand {
    /// Creates a new patterns command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Lists the stored locators.
    pub fn show(&self, smart: &SmartParser) -> String {
        Formatter::new(self.config.format).format_store(&smart.snapshot())
    }

    /// Lists locators the file would add, without saving them.
    pub fn discover(&self, smart: &SmartParser, path: &Path) -> Result<String> {
        let document = read_document(path)?;
        let candidates = smart.discover(&document);

        Ok(Formatter::new(self.config.format).format_candidates(&candidates))
    }

    /// Runs the stored locators over the file and validates the result.
    pub fn extract(&self, smart: &SmartParser, path: &Path) -> Result<String> {
        let document = read_document(path)?;
        let result = smart.extract(&document);
        let errors = check(&result);

        Ok(Formatter::new(self.config.format).format_extraction(&result, &errors))
    }

    /// Learns from the file and saves the store.
    ///
    /// The store parser's own reading of the page is what learned locators
    /// are checked against when verification is on.
    pub fn learn(&self, smart: &SmartParser, path: &Path) -> Result<String> {
        let document = read_document(path)?;

        let parser = Parser::new(smart, &self.config.base_url);
        let confirmed = parser.standard_parse(&document).fields;

        let added = smart.learn(&document, &confirmed);
        info!("Pattern store at {}", smart.path().display());

        Ok(Formatter::new(self.config.format).format_candidates(&added))
    }
}

fn read_document(path: &Path) -> Result<Html> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read HTML file: {}", path.display()))?;
    Ok(Html::parse_document(&html))
}
