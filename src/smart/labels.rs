//! Locale label tables used by pattern discovery and extraction.
//!
//! Every literal the heuristics look for (field labels, currency tokens,
//! stock phrases, title hints) lives here so the core stays locale-agnostic.
//! Defaults cover Ukrainian and Russian storefronts.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Label synonyms per field, loaded from the `[labels]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Tokens that follow a price, e.g. "грн".
    #[serde(default = "default_currency_tokens")]
    pub currency_tokens: Vec<String>,

    /// Labels preceding a model number or SKU.
    #[serde(default = "default_model_labels")]
    pub model_labels: Vec<String>,

    /// Labels preceding a brand or manufacturer.
    #[serde(default = "default_brand_labels")]
    pub brand_labels: Vec<String>,

    /// Phrases meaning the product can be bought.
    #[serde(default = "default_in_stock")]
    pub in_stock: Vec<String>,

    /// Phrases meaning the product is sold out.
    #[serde(default = "default_out_of_stock")]
    pub out_of_stock: Vec<String>,

    /// CSS selector for title candidates.
    #[serde(default = "default_title_selector")]
    pub title_selector: String,
}

fn default_currency_tokens() -> Vec<String> {
    vec!["грн".into(), "₴".into()]
}

fn default_model_labels() -> Vec<String> {
    vec!["Модель".into(), "Артикул".into()]
}

fn default_brand_labels() -> Vec<String> {
    vec!["Виробник".into(), "Бренд".into(), "Производитель".into()]
}

fn default_in_stock() -> Vec<String> {
    vec!["в наявності".into(), "в наличии".into()]
}

fn default_out_of_stock() -> Vec<String> {
    vec!["немає в наявності".into(), "нет в наличии".into()]
}

fn default_title_selector() -> String {
    "h1, h2, .product-name".to_string()
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            currency_tokens: default_currency_tokens(),
            model_labels: default_model_labels(),
            brand_labels: default_brand_labels(),
            in_stock: default_in_stock(),
            out_of_stock: default_out_of_stock(),
            title_selector: default_title_selector(),
        }
    }
}

impl LabelConfig {
    /// English storefront labels.
    pub fn english() -> Self {
        Self {
            currency_tokens: vec!["USD".into(), "EUR".into()],
            model_labels: vec!["Model".into(), "SKU".into()],
            brand_labels: vec!["Brand".into(), "Manufacturer".into()],
            in_stock: vec!["in stock".into()],
            out_of_stock: vec!["out of stock".into()],
            title_selector: default_title_selector(),
        }
    }

    /// Compiles the label tables into matchers.
    pub fn compile(&self) -> LabelPatterns {
        LabelPatterns {
            price: alternation(&self.currency_tokens, escape)
                .and_then(|alt| Regex::new(&format!(r"\d+[\s,.]?\d*\s*(?:{alt})")).ok()),
            model: alternation(&self.model_labels, escape)
                .and_then(|alt| Regex::new(&format!(r"(?:{alt}):\s*([A-Za-z0-9-]+)")).ok()),
            brand: alternation(&self.brand_labels, escape)
                .and_then(|alt| Regex::new(&format!(r"(?:{alt}):\s*([A-Za-z]+)")).ok()),
            availability: alternation(
                self.out_of_stock.iter().chain(self.in_stock.iter()),
                phrase,
            )
            .and_then(|alt| Regex::new(&alt).ok()),
            in_stock: lowercased(&self.in_stock),
            out_of_stock: lowercased(&self.out_of_stock),
            title_selector: self.title_selector.clone(),
        }
    }
}

/// Compiled form of [`LabelConfig`].
///
/// A matcher is `None` when its label list is empty, which disables
/// discovery and extraction for that field.
#[derive(Debug, Clone)]
pub struct LabelPatterns {
    pub price: Option<Regex>,
    pub model: Option<Regex>,
    pub brand: Option<Regex>,
    pub availability: Option<Regex>,
    in_stock: Vec<String>,
    out_of_stock: Vec<String>,
    pub title_selector: String,
}

impl LabelPatterns {
    /// Reads a stock flag out of already-lowercased text.
    ///
    /// Sold-out phrases win, since they usually embed the in-stock phrase
    /// ("немає в наявності" contains "в наявності").
    pub fn is_in_stock(&self, lowered: &str) -> bool {
        if self.out_of_stock.iter().any(|p| lowered.contains(p.as_str())) {
            return false;
        }
        self.in_stock.iter().any(|p| lowered.contains(p.as_str()))
    }
}

impl Default for LabelPatterns {
    fn default() -> Self {
        LabelConfig::default().compile()
    }
}

fn lowercased(phrases: &[String]) -> Vec<String> {
    phrases.iter().map(|p| p.to_lowercase()).collect()
}

fn escape(label: &str) -> String {
    regex_lite::escape(label.trim())
}

/// Phrase pattern: first letter in either case, spaces match any whitespace run.
fn phrase(text: &str) -> String {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return String::new();
    };

    let mut chars = first.chars();
    let mut out = match chars.next() {
        Some(c) => {
            let lower: String = c.to_lowercase().collect();
            let upper: String = c.to_uppercase().collect();
            if lower == upper {
                regex_lite::escape(&lower)
            } else {
                format!("(?:{}|{})", regex_lite::escape(&upper), regex_lite::escape(&lower))
            }
        }
        None => String::new(),
    };
    out.push_str(&regex_lite::escape(chars.as_str()));

    for word in words {
        out.push_str(r"\s+");
        out.push_str(&regex_lite::escape(word));
    }
    out
}

fn alternation<'a, I>(items: I, render: fn(&str) -> String) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let parts: Vec<String> =
        items.into_iter().map(|s| render(s)).filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        let labels = LabelConfig::default();
        assert!(labels.currency_tokens.contains(&"грн".to_string()));
        assert!(labels.model_labels.contains(&"Артикул".to_string()));
        assert_eq!(labels.title_selector, "h1, h2, .product-name");
    }

    #[test]
    fn test_price_pattern() {
        let patterns = LabelPatterns::default();
        let price = patterns.price.as_ref().unwrap();
        assert!(price.is_match("1299 грн"));
        assert!(price.is_match("1 299₴"));
        assert!(price.is_match("Ціна: 45,50 грн"));
        assert!(!price.is_match("1299 USD"));
        assert!(!price.is_match("грн"));
    }

    #[test]
    fn test_model_and_brand_capture() {
        let patterns = LabelPatterns::default();

        let caps = patterns.model.as_ref().unwrap().captures("Артикул: AB-123 ").unwrap();
        assert_eq!(&caps[1], "AB-123");

        let caps = patterns.brand.as_ref().unwrap().captures("Бренд: Lugi").unwrap();
        assert_eq!(&caps[1], "Lugi");

        // Labels are case-sensitive
        assert!(patterns.brand.as_ref().unwrap().captures("бренд: Lugi").is_none());
    }

    #[test]
    fn test_availability_pattern_first_letter_case() {
        let patterns = LabelPatterns::default();
        let re = patterns.availability.as_ref().unwrap();
        assert!(re.is_match("В наявності"));
        assert!(re.is_match("в  наявності"));
        assert!(re.is_match("Немає в наявності"));
        assert!(re.is_match("Нет в наличии"));
        assert!(!re.is_match("ВНАЯВНОСТІ"));
    }

    #[test]
    fn test_is_in_stock() {
        let patterns = LabelPatterns::default();
        assert!(patterns.is_in_stock("товар в наявності"));
        assert!(patterns.is_in_stock("в наличии"));
        assert!(!patterns.is_in_stock("немає в наявності"));
        assert!(!patterns.is_in_stock("очікується"));
    }

    #[test]
    fn test_english_preset() {
        let patterns = LabelConfig::english().compile();
        let caps = patterns.model.as_ref().unwrap().captures("SKU: X-1").unwrap();
        assert_eq!(&caps[1], "X-1");
        assert!(patterns.availability.as_ref().unwrap().is_match("In stock"));
        assert!(!patterns.is_in_stock("out of stock"));
    }

    #[test]
    fn test_empty_labels_disable_matchers() {
        let labels = LabelConfig { model_labels: Vec::new(), ..LabelConfig::default() };
        let patterns = labels.compile();
        assert!(patterns.model.is_none());
        assert!(patterns.brand.is_some());
    }

    #[test]
    fn test_labels_from_toml_partial() {
        let labels: LabelConfig = toml::from_str(
            r#"
            model_labels = ["Код"]
            "#,
        )
        .unwrap();
        assert_eq!(labels.model_labels, vec!["Код"]);
        assert_eq!(labels.currency_tokens, default_currency_tokens());
    }

    #[test]
    fn test_labels_are_escaped() {
        let labels =
            LabelConfig { currency_tokens: vec!["$".into(), "u.s.".into()], ..Default::default() };
        let re = labels.compile().price.unwrap();
        assert!(re.is_match("10 $"));
        assert!(re.is_match("10 u.s."));
        assert!(!re.is_match("10 uxsx"));
    }
}
