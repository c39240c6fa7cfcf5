//! Fallback extraction over stored locators.

use crate::smart::labels::LabelPatterns;
use crate::smart::locator::MarkupNode;
use crate::smart::store::{Field, PatternStore};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Field values pulled from a single document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<bool>,
}

/// A single extracted value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{:.2}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Flag(true) => f.write_str("in stock"),
            FieldValue::Flag(false) => f.write_str("out of stock"),
        }
    }
}

impl ExtractionResult {
    /// Returns true if no field was extracted.
    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    /// Fields that carry a value.
    pub fn present_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| self.value(*f).is_some()).collect()
    }

    /// Value of one field.
    pub fn value(&self, field: Field) -> Option<FieldValue> {
        match field {
            Field::Price => self.price.map(FieldValue::Number),
            Field::Title => self.title.clone().map(FieldValue::Text),
            Field::Model => self.model.clone().map(FieldValue::Text),
            Field::Brand => self.brand.clone().map(FieldValue::Text),
            Field::Availability => self.availability.map(FieldValue::Flag),
        }
    }

    fn set(&mut self, field: Field, value: FieldValue) {
        match (field, value) {
            (Field::Price, FieldValue::Number(n)) => self.price = Some(n),
            (Field::Title, FieldValue::Text(s)) => self.title = Some(s),
            (Field::Model, FieldValue::Text(s)) => self.model = Some(s),
            (Field::Brand, FieldValue::Text(s)) => self.brand = Some(s),
            (Field::Availability, FieldValue::Flag(b)) => self.availability = Some(b),
            _ => {}
        }
    }
}

/// Reads field values through stored locators.
pub struct Extractor<'p> {
    patterns: &'p LabelPatterns,
}

impl<'p> Extractor<'p> {
    /// Creates an extractor using the given label matchers.
    pub fn new(patterns: &'p LabelPatterns) -> Self {
        Self { patterns }
    }

    /// Extracts every field the store has a working locator for.
    pub fn extract(&self, document: &Html, store: &PatternStore) -> ExtractionResult {
        let mut result = ExtractionResult::default();

        for field in Field::ALL {
            let found = store
                .get(field)
                .iter()
                .find_map(|locator| self.extract_with(document, field, locator));

            if let Some(value) = found {
                result.set(field, value);
            }
        }

        result
    }

    /// Tries one locator for one field.
    pub fn extract_with(&self, document: &Html, field: Field, locator: &str) -> Option<FieldValue> {
        let selector = match Selector::parse(locator) {
            Ok(s) => s,
            Err(_) => {
                trace!("Skipping unparsable {} locator: {}", field, locator);
                return None;
            }
        };

        let Some(node) = document.select(&selector).next() else {
            trace!("No {} node for locator: {}", field, locator);
            return None;
        };

        self.read(field, node)
    }

    fn read(&self, field: Field, node: ElementRef<'_>) -> Option<FieldValue> {
        let text = node.text_content();

        match field {
            Field::Price => parse_price(&text).map(FieldValue::Number),
            Field::Title => {
                let title = clean_text(&text);
                (!title.is_empty()).then_some(FieldValue::Text(title))
            }
            Field::Model => self.capture(self.patterns.model.as_ref(), &text),
            Field::Brand => self.capture(self.patterns.brand.as_ref(), &text),
            Field::Availability => {
                Some(FieldValue::Flag(self.patterns.is_in_stock(&text.to_lowercase())))
            }
        }
    }

    fn capture(&self, re: Option<&regex_lite::Regex>, text: &str) -> Option<FieldValue> {
        let caps = re?.captures(text)?;
        caps.get(1).map(|m| FieldValue::Text(m.as_str().to_string()))
    }
}

/// Digits-only price reading; zero and unparsable values are rejected.
pub fn parse_price(text: &str) -> Option<f64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    digits.parse::<f64>().ok().filter(|p| p.is_finite() && *p > 0.0)
}

/// Collapses whitespace runs and trims.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
