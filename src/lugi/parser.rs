//! HTML parser for LUGI search results and product pages.

use crate::lugi::models::{Price, Product, SearchHit};
use crate::lugi::selectors::{product, search};
use crate::smart::extract::{clean_text, parse_price};
use crate::smart::{ExtractionResult, SmartParser, Source};
use anyhow::Result;
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Result of the store's own selectors on a product page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandardPage {
    /// Fields shared with the pattern store
    pub fields: ExtractionResult,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub specifications: BTreeMap<String, String>,
}

impl StandardPage {
    /// Returns true if any selector produced data.
    pub fn is_usable(&self) -> bool {
        !self.fields.is_empty()
            || self.description.is_some()
            || !self.images.is_empty()
            || !self.specifications.is_empty()
    }
}

/// Parser for LUGI HTML pages, with the learned fallback behind it.
pub struct Parser<'s> {
    smart: &'s SmartParser,
    base_url: String,
}

impl<'s> Parser<'s> {
    /// Creates a parser resolving relative links against `base_url`.
    pub fn new(smart: &'s SmartParser, base_url: impl Into<String>) -> Self {
        Self { smart, base_url: base_url.into() }
    }

    /// Parses a product page, falling back to learned locators when the
    /// store's selectors find nothing.
    pub fn parse_product_page(&self, html: &str, url: &str) -> Result<Product> {
        let document = Html::parse_document(html);

        let page = self.standard_parse(&document);
        let usable = page.is_usable();
        let resolution = self.smart.resolve_with(&document, page.fields.clone(), usable);

        if !usable && resolution.source == Source::None {
            anyhow::bail!("No product data found on page: {}", url);
        }

        let fields = resolution.fields;
        let available = self.buy_button_available(&document).or(fields.availability).unwrap_or(false);

        Ok(Product {
            title: fields.title.unwrap_or_default(),
            url: url.to_string(),
            price: fields.price.map(Price::uah),
            description: page.description.unwrap_or_default(),
            images: page.images,
            specifications: page.specifications,
            available,
            brand: fields.brand,
            model: fields.model,
            source: resolution.source,
        })
    }

    /// Runs the store's hard-coded selectors.
    pub fn standard_parse(&self, document: &Html) -> StandardPage {
        let mut page = StandardPage::default();

        page.fields.title = product::TITLE
            .iter()
            .find_map(|sel| document.select(sel).next())
            .map(|e| clean_text(&e.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        page.fields.price = document
            .select(&product::PRICE)
            .next()
            .and_then(|e| parse_price(&e.text().collect::<String>()));

        page.fields.availability = document.select(&product::STOCK_STATUS).next().map(|e| {
            let text = e.text().collect::<String>().to_lowercase();
            self.smart.label_patterns().is_in_stock(&text)
        });

        page.description = document
            .select(&product::DESCRIPTION)
            .next()
            .map(visible_text)
            .filter(|d| !d.is_empty());

        page.images = self.parse_images(document);
        page.specifications = parse_specifications(document);

        page
    }

    fn parse_images(&self, document: &Html) -> Vec<String> {
        let mut images: Vec<String> = Vec::new();

        let candidates = document
            .select(&product::MAIN_IMAGE)
            .take(1)
            .chain(document.select(&product::ADDITIONAL_IMAGES));

        for img in candidates {
            let src = product::IMAGE_ATTRS
                .iter()
                .find_map(|attr| img.value().attr(attr).filter(|s| !s.trim().is_empty()));

            if let Some(src) = src {
                let url = join_url(&self.base_url, src.trim());
                if !images.contains(&url) {
                    images.push(url);
                }
            }
        }

        images
    }

    /// Availability from the buy button, when the page has one.
    fn buy_button_available(&self, document: &Html) -> Option<bool> {
        let button = document.select(&product::BUY_BUTTON).next()?;
        let disabled = button
            .value()
            .attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == "disabled"));
        Some(!disabled)
    }
}

/// Parses search results into product links, at most `limit`.
pub fn parse_search(html: &str, base_url: &str, limit: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let mut hits = Vec::new();

    for card in document.select(&search::CARD) {
        if hits.len() >= limit {
            break;
        }

        let href = card
            .select(&search::IMAGE_LINK)
            .chain(card.select(&search::NAME_LINK))
            .find_map(|a| a.value().attr("href").filter(|h| !h.trim().is_empty()));

        let Some(href) = href else {
            warn!("No product link in search card");
            continue;
        };

        let url = join_url(base_url, href);
        trace!("Found product URL: {}", url);

        let name = card
            .select(&search::NAME)
            .next()
            .map(|e| clean_text(&e.text().collect::<String>()))
            .filter(|n| !n.is_empty());

        let price = card
            .select(&search::PRICE)
            .next()
            .and_then(|e| parse_price(&e.text().collect::<String>()));

        hits.push(SearchHit { url, name, price });
    }

    debug!("Parsed {} search hits", hits.len());
    hits
}

fn parse_specifications(document: &Html) -> BTreeMap<String, String> {
    let mut specs = BTreeMap::new();

    for row in document.select(&product::SPEC_ROWS) {
        let cells: Vec<String> = row
            .select(&product::SPEC_CELLS)
            .map(|c| clean_text(&c.text().collect::<String>()))
            .collect();

        if let [name, value, ..] = cells.as_slice() {
            if !name.is_empty() && !value.is_empty() {
                specs.insert(name.clone(), value.clone());
            }
        }
    }

    specs
}

/// Text of an element without script and style contents.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_text(element, &mut parts);
    clean_text(&parts.join(" "))
}

fn collect_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push(&**text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !matches!(child.value().name(), "script" | "style") {
                collect_text(child, out);
            }
        }
    }
}

/// Makes `href` absolute against `base`.
pub fn join_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), href.trim_start_matches('/'))
    }
}
