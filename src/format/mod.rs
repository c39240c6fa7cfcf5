//! Output formatting for products, search hits and pattern data (table, JSON, markdown).

use crate::config::OutputFormat;
use crate::lugi::{Product, SearchHit};
use crate::smart::{Candidates, ExtractionResult, Field, PatternStore, ValidationError};
use serde_json::json;

/// Formats results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single product.
    pub fn format_product(&self, product: &Product) -> String {
        match self.format {
            OutputFormat::Json => to_json(product, "{}"),
            OutputFormat::Table => self.table_product(product),
            OutputFormat::Markdown => self.markdown_product(product),
        }
    }

    /// Formats several products.
    pub fn format_products(&self, products: &[Product]) -> String {
        if products.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                _ => "No products found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => to_json(products, "[]"),
            OutputFormat::Table => {
                products.iter().map(|p| self.table_product(p)).collect::<Vec<_>>().join("\n\n")
            }
            OutputFormat::Markdown => {
                products.iter().map(|p| self.markdown_product(p)).collect::<Vec<_>>().join("\n\n---\n\n")
            }
        }
    }

    /// Formats search hits.
    pub fn format_hits(&self, hits: &[SearchHit]) -> String {
        if hits.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                _ => "No products found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => to_json(hits, "[]"),
            OutputFormat::Table => self.table_hits(hits),
            OutputFormat::Markdown => self.markdown_hits(hits),
        }
    }

    /// Formats an extraction result with the rules it broke.
    pub fn format_extraction(&self, result: &ExtractionResult, errors: &[ValidationError]) -> String {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "fields": result,
                    "valid": errors.is_empty(),
                    "errors": errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
                });
                to_json(&value, "{}")
            }
            OutputFormat::Table | OutputFormat::Markdown => {
                let markdown = self.format == OutputFormat::Markdown;
                let mut lines = Vec::new();

                if result.is_empty() {
                    lines.push("Nothing extracted.".to_string());
                }
                for field in Field::ALL {
                    if let Some(value) = result.value(field) {
                        lines.push(if markdown {
                            format!("- **{}:** {}", field, value)
                        } else {
                            format!("{:<13}{}", format!("{}:", field), value)
                        });
                    }
                }

                lines.push(String::new());
                if errors.is_empty() {
                    lines.push("Valid: yes".to_string());
                } else {
                    lines.push("Valid: no".to_string());
                    lines.extend(errors.iter().map(|e| format!("  - {}", e)));
                }

                lines.join("\n")
            }
        }
    }

    /// Formats the whole pattern store.
    pub fn format_store(&self, store: &PatternStore) -> String {
        match self.format {
            OutputFormat::Json => to_json(store, "{}"),
            _ => self.listing(Field::ALL.iter().map(|&f| (f, store.get(f))), store.len()),
        }
    }

    /// Formats a candidate set.
    pub fn format_candidates(&self, candidates: &Candidates) -> String {
        match self.format {
            OutputFormat::Json => to_json(candidates, "{}"),
            _ => self.listing(Field::ALL.iter().map(|&f| (f, candidates.get(f))), candidates.len()),
        }
    }

    // Table formatting

    fn table_product(&self, product: &Product) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Title:   {}", product.title));
        lines.push(format!("URL:     {}", product.url));

        match &product.price {
            Some(price) => lines.push(format!("Price:   {:.2} {}", price.value, price.currency)),
            None => lines.push("Price:   N/A".to_string()),
        }

        if let Some(brand) = &product.brand {
            lines.push(format!("Brand:   {}", brand));
        }
        if let Some(model) = &product.model {
            lines.push(format!("Model:   {}", model));
        }

        lines.push(format!(
            "Stock:   {}",
            if product.available { "In Stock" } else { "Out of Stock" }
        ));
        lines.push(format!("Source:  {}", product.source));

        if !product.images.is_empty() {
            lines.push(format!("Images:  {}", product.images.len()));
        }

        if !product.specifications.is_empty() {
            lines.push(String::new());
            let width = product.specifications.keys().map(|k| k.chars().count()).max().unwrap_or(0);
            for (name, value) in &product.specifications {
                lines.push(format!("  {:<width$}  {}", name, value));
            }
        }

        if !product.description.is_empty() {
            lines.push(String::new());
            lines.push(truncate(&product.description, 300));
        }

        lines.join("\n")
    }

    fn table_hits(&self, hits: &[SearchHit]) -> String {
        let price_width = 10;
        let name_width = 40;

        let mut lines = Vec::new();

        lines.push(format!("{:<price_width$}  {:<name_width$}  {}", "Price", "Name", "URL"));
        lines.push(format!("{:-<price_width$}  {:-<name_width$}  {:-<30}", "", "", ""));

        for hit in hits {
            let price = hit.price.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "N/A".to_string());
            let name = truncate(hit.name.as_deref().unwrap_or("-"), name_width);

            lines.push(format!("{:>price_width$}  {:<name_width$}  {}", price, name, hit.url));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", hits.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_product(&self, product: &Product) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", product.title));
        lines.push(String::new());

        lines.push(format!("- **URL:** [View in store]({})", product.url));

        if let Some(price) = &product.price {
            lines.push(format!("- **Price:** {:.2} {}", price.value, price.currency));
        }
        if let Some(brand) = &product.brand {
            lines.push(format!("- **Brand:** {}", brand));
        }
        if let Some(model) = &product.model {
            lines.push(format!("- **Model:** {}", model));
        }

        lines.push(format!(
            "- **Stock:** {}",
            if product.available { "In Stock" } else { "Out of Stock" }
        ));
        lines.push(format!("- **Source:** {}", product.source));

        if !product.specifications.is_empty() {
            lines.push(String::new());
            lines.push("| Specification | Value |".to_string());
            lines.push("|---------------|-------|".to_string());
            for (name, value) in &product.specifications {
                lines.push(format!("| {} | {} |", name, value));
            }
        }

        if let Some(image) = product.images.first() {
            lines.push(String::new());
            lines.push(format!("![{}]({})", product.title, image));
        }

        if !product.description.is_empty() {
            lines.push(String::new());
            lines.push(product.description.clone());
        }

        lines.join("\n")
    }

    fn markdown_hits(&self, hits: &[SearchHit]) -> String {
        let mut lines = Vec::new();

        lines.push("| Price | Name |".to_string());
        lines.push("|-------|------|".to_string());

        for hit in hits {
            let price = hit.price.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "N/A".to_string());
            let name = truncate(hit.name.as_deref().unwrap_or("-"), 40);
            lines.push(format!("| {} | [{}]({}) |", price, name, hit.url));
        }

        lines.push(String::new());
        lines.push(format!("*{} products found*", hits.len()));

        lines.join("\n")
    }

    // Shared by stores and candidate sets

    fn listing<'a>(
        &self,
        groups: impl Iterator<Item = (Field, &'a [String])>,
        total: usize,
    ) -> String {
        let markdown = self.format == OutputFormat::Markdown;
        let mut lines = Vec::new();

        for (field, locators) in groups {
            if markdown {
                lines.push(format!("### {} ({})", field, locators.len()));
                lines.extend(locators.iter().map(|l| format!("- `{}`", l)));
            } else {
                lines.push(format!("{} ({})", field, locators.len()));
                lines.extend(locators.iter().map(|l| format!("  {}", l)));
            }
        }

        lines.push(String::new());
        lines.push(format!("Total: {} locators", total));

        lines.join("\n")
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
}

/// Shortens `s` to at most `width` characters.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
